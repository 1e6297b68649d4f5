//! Entrypoint for the `lexicon` binary.

// Page controllers hold `Rc` state, so commands run on one thread.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    std::process::exit(lexicon_cli::run().await);
}
