// installs the json subscriber used by every entry point of the circulation desk,
// a subscriber that is already installed is kept
pub fn setup_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .json()
        .try_init();
}

#[cfg(test)]
mod tests {
    use crate::utils::logs::setup_tracing;

    #[tokio::test]
    async fn test_should_setup_tracing_twice() {
        setup_tracing();
        setup_tracing();
        tracing::info!(asset_id = "a1", "tracing is ready");
    }
}
