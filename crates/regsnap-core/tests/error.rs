//! Tests for error handling

use regsnap_core::error::{SnapshotError, SnapshotResult};
use regsnap_core::Architecture;

#[test]
fn test_truncated_display()
{
    let error = SnapshotError::Truncated {
        arch: Architecture::Arm64,
        expected: 272,
        actual: 100,
    };
    let message = format!("{}", error);
    assert!(message.contains("arm64"));
    assert!(message.contains("272"));
    assert!(message.contains("100"));
}

#[test]
fn test_invalid_message_display()
{
    let error = SnapshotError::InvalidMessage("unterminated text".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Invalid debug message"));
    assert!(message.contains("unterminated text"));
}

#[test]
fn test_invalid_argument_display()
{
    let error = SnapshotError::InvalidArgument("test arg".to_string());
    let message = format!("{}", error);
    assert!(message.contains("Invalid argument"));
    assert!(message.contains("test arg"));
}

#[test]
fn test_unknown_architecture_is_invalid_argument()
{
    match "mips".parse::<Architecture>() {
        Err(SnapshotError::InvalidArgument(message)) => assert!(message.contains("mips")),
        other => panic!("Expected InvalidArgument, got {other:?}"),
    }
}

#[test]
fn test_io_error_conversion()
{
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "dump.bin");
    let error: SnapshotError = io_err.into();

    match error {
        SnapshotError::Io(_) => {
            // Expected: io::Error should convert to Io variant
        }
        _ => panic!("Expected Io variant"),
    }
}

#[test]
fn test_result_type()
{
    // Test that Result type is properly aliased
    let _result: SnapshotResult<()> = Ok(());
    let _error_result: SnapshotResult<()> = Err(SnapshotError::InvalidArgument("x".to_string()));
}
