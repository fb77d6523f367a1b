//! Test fixtures for the CSV parser


/// Five-column track file with two rows
pub fn create_test_csv() -> String {
    r#"formation_time,death_time,formation_coords,radius,death_coords
2023-01-01 09:00:00,2023-01-03 18:00:00,"71.5, 12.0",300,"74.0, 20.5"
2023-01-05 06:00:00,2023-01-06 12:00:00,"70.1, 5.3",250,"72.8, 9.9"
"#
    .to_string()
}
