use test_suite::TestRunner;
use tracing_subscriber::EnvFilter;

#[test]
fn run_all_test_cases() {
    // RUST_LOG=vouch_schema=debug shows union decisions for failing cases.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();

    let runner = TestRunner::new("cases");
    let results = runner.run_all().expect("Failed to run test suite");

    // Print results
    println!("\n=== Test Suite Results ===");
    println!("Total: {}", results.total());
    println!("Passed: {}", results.passed);
    println!("Failed: {}", results.failures.len());

    if !results.failures.is_empty() {
        println!("\n=== Failures ===");
        for failure in &results.failures {
            println!("\n{failure}");
        }
    }

    assert!(
        results.is_success(),
        "Test suite failed with {} failures",
        results.failures.len()
    );
}
