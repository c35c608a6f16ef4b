use std::io::Cursor;

use super::*;

#[test]
fn safe_read_rejects_absent_source() {
    let mut buf = [0u8; 4];
    let err = safe_read::<Cursor<Vec<u8>>>(&mut buf, 1, 4, None).unwrap_err();
    assert!(matches!(err, CaffError::InvalidHandle(_)));
}

#[test]
fn safe_read_rejects_requests_larger_than_destination() {
    let mut src = Cursor::new(vec![0u8; 16]);
    let mut buf = [0u8; 4];
    let err = safe_read(&mut buf, 2, 3, Some(&mut src)).unwrap_err();
    assert!(matches!(
        err,
        CaffError::CapacityExceeded {
            requested: 6,
            capacity: 4
        }
    ));

    let err = safe_read(&mut buf, usize::MAX, 2, Some(&mut src)).unwrap_err();
    assert!(matches!(err, CaffError::CapacityExceeded { .. }));
}

#[test]
fn safe_read_returns_short_count_at_end_of_stream() {
    let mut src = Cursor::new(vec![1u8, 2, 3]);
    let mut buf = [0u8; 8];
    let n = safe_read(&mut buf, 1, 8, Some(&mut src)).unwrap();
    assert_eq!(n, 3);
    assert_eq!(&buf[..3], &[1, 2, 3]);
}

#[test]
fn safe_copy_checks_both_sides() {
    let mut dest = [0u8; 2];
    assert!(matches!(
        safe_copy(&mut dest, None, 1).unwrap_err(),
        CaffError::InvalidHandle(_)
    ));
    assert!(matches!(
        safe_copy(&mut dest, Some(&[1, 2, 3]), 3).unwrap_err(),
        CaffError::CapacityExceeded { .. }
    ));
    assert!(matches!(
        safe_copy(&mut dest, Some(&[1]), 2).unwrap_err(),
        CaffError::CapacityExceeded { .. }
    ));

    safe_copy(&mut dest, Some(&[7, 8, 9]), 2).unwrap();
    assert_eq!(dest, [7, 8]);
}

#[test]
fn checked_add_never_wraps() {
    assert_eq!(checked_add(1, 2).unwrap(), 3);
    assert_eq!(checked_add(u64::MAX - 1, 1).unwrap(), u64::MAX);
    for delta in [1u64, 2, 1 << 20, u64::MAX] {
        let err = checked_add(u64::MAX, delta).unwrap_err();
        assert!(matches!(err, CaffError::CounterOverflow { .. }));
    }
    assert!(matches!(
        checked_add(u64::MAX - 5, 6).unwrap_err(),
        CaffError::CounterOverflow {
            acc,
            delta: 6
        } if acc == u64::MAX - 5
    ));
}

#[test]
fn stream_reader_counts_little_endian_fields() {
    let mut bytes = vec![0xAB];
    bytes.extend_from_slice(&0x0102u16.to_le_bytes());
    bytes.extend_from_slice(&0x1122_3344_5566_7788u64.to_le_bytes());
    let mut r = StreamReader::new(Cursor::new(bytes));

    assert_eq!(r.read_u8().unwrap(), 0xAB);
    let mark = r.consumed();
    assert_eq!(r.read_u16_le().unwrap(), 0x0102);
    assert_eq!(r.read_u64_le().unwrap(), 0x1122_3344_5566_7788);
    assert_eq!(r.consumed(), 11);
    assert_eq!(r.consumed_since(mark), 10);
    assert_eq!(r.try_read_u8().unwrap(), None);
}

#[test]
fn stream_reader_reports_truncation_as_unexpected_eof() {
    let mut r = StreamReader::new(Cursor::new(vec![1u8, 2, 3]));
    let err = r.read_u64_le().unwrap_err();
    assert!(err.is_unexpected_eof());
    assert_eq!(r.consumed(), 3);
}

#[test]
fn released_stream_rejects_reads() {
    let mut r = StreamReader::new(Cursor::new(vec![1u8, 2, 3]));
    r.release();
    assert!(!r.is_open());
    assert!(matches!(
        r.read_u8().unwrap_err(),
        CaffError::InvalidHandle(_)
    ));
    assert!(r.into_inner().is_none());
}
