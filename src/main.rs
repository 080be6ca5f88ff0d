use std::process::exit;

// one request in flight at a time, so a single thread is all a run needs
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let exit_code = s3_purge::main_rs().await;

    exit(exit_code);
}
