use super::*;

fn sample_df() -> DataFrame {
    DataFrame::new(vec![
        ("a".to_string(), Vector::from_slice(&[1.0, 2.0, 3.0])),
        ("b".to_string(), Vector::from_slice(&[4.0, 5.0, 6.0])),
        ("target".to_string(), Vector::from_slice(&[0.0, 1.0, 0.0])),
    ])
    .expect("valid frame")
}

#[test]
fn test_new_rejects_empty() {
    assert!(matches!(
        DataFrame::new(vec![]),
        Err(NngaError::EmptyData(_))
    ));
}

#[test]
fn test_new_rejects_ragged_columns() {
    let result = DataFrame::new(vec![
        ("a".to_string(), Vector::from_slice(&[1.0, 2.0])),
        ("b".to_string(), Vector::from_slice(&[1.0])),
    ]);
    assert!(matches!(result, Err(NngaError::DimensionMismatch { .. })));
}

#[test]
fn test_new_rejects_duplicate_names() {
    let result = DataFrame::new(vec![
        ("a".to_string(), Vector::from_slice(&[1.0])),
        ("a".to_string(), Vector::from_slice(&[2.0])),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_column_lookup() {
    let df = sample_df();
    assert_eq!(df.column("b").expect("exists").as_slice(), &[4.0, 5.0, 6.0]);
    assert!(matches!(
        df.column("zzz"),
        Err(NngaError::ColumnNotFound(name)) if name == "zzz"
    ));
}

#[test]
fn test_drop_keeps_order() {
    let df = sample_df().drop("a").expect("drop a");
    assert_eq!(df.column_names(), vec!["b", "target"]);
}

#[test]
fn test_drop_last_column_fails() {
    let df = DataFrame::new(vec![("only".to_string(), Vector::from_slice(&[1.0]))])
        .expect("valid frame");
    assert!(df.drop("only").is_err());
}

#[test]
fn test_split_target() {
    let (x, y, names) = sample_df().split_target("target").expect("split");
    assert_eq!(x.shape(), (3, 2));
    assert_eq!(x.row_slice(1), &[2.0, 5.0]);
    assert_eq!(y.as_slice(), &[0.0, 1.0, 0.0]);
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_split_missing_target() {
    assert!(matches!(
        sample_df().split_target("nope"),
        Err(NngaError::ColumnNotFound(_))
    ));
}

#[test]
fn test_select_and_add_column() {
    let mut df = sample_df().select(&["b", "a"]).expect("select");
    assert_eq!(df.column_names(), vec!["b", "a"]);
    df.add_column("c".to_string(), Vector::from_slice(&[7.0, 8.0, 9.0]))
        .expect("add");
    assert_eq!(df.shape(), (3, 3));
    assert!(df
        .add_column("c".to_string(), Vector::from_slice(&[0.0, 0.0, 0.0]))
        .is_err());
    assert!(df
        .add_column("d".to_string(), Vector::from_slice(&[0.0]))
        .is_err());
}

#[test]
fn test_from_csv_str() {
    let csv = "x1, x2,y\n1,2,3\n\n4,5,6\n";
    let df = DataFrame::from_csv_str(csv).expect("parse");
    assert_eq!(df.shape(), (2, 3));
    assert_eq!(df.column_names(), vec!["x1", "x2", "y"]);
    assert_eq!(df.column("y").expect("y").as_slice(), &[3.0, 6.0]);
}

#[test]
fn test_from_csv_str_quoted_fields() {
    let csv = "\"x\",\"y\"\r\n\"1.5\", 2\r\n3,\"4\"\r\n";
    let df = DataFrame::from_csv_str(csv).expect("parse");
    assert_eq!(df.column_names(), vec!["x", "y"]);
    assert!(df.has_column("y"));
    assert_eq!(df.column("x").expect("x").as_slice(), &[1.5, 3.0]);
    assert_eq!(df.column("y").expect("y").as_slice(), &[2.0, 4.0]);
}

#[test]
fn test_from_csv_str_quoted_header_with_comma() {
    let df = DataFrame::from_csv_str("\"price, usd\",rooms\n100,2\n").expect("parse");
    assert_eq!(df.column_names(), vec!["price, usd", "rooms"]);
    assert_eq!(df.n_cols(), 2);
}

#[test]
fn test_from_csv_str_empty_input() {
    assert!(DataFrame::from_csv_str("").is_err());
}

#[test]
fn test_from_csv_str_rejects_text_cells() {
    let err = DataFrame::from_csv_str("a,b\n1,two\n").unwrap_err();
    assert!(err.to_string().contains("two"));
}

#[test]
fn test_from_csv_str_rejects_ragged_rows() {
    assert!(DataFrame::from_csv_str("a,b\n1,2,3\n").is_err());
}

#[test]
fn test_read_csv_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data.csv");
    std::fs::write(&path, "a,b\n1,2\n3,4\n").expect("write");
    let df = DataFrame::read_csv(&path).expect("read");
    assert_eq!(df.n_rows(), 2);
    assert!(matches!(
        DataFrame::read_csv(dir.path().join("missing.csv")),
        Err(NngaError::Io(_))
    ));
}
