use super::*;

#[test]
fn test_empty_file_gives_defaults() {
    let config = ToolConfig::from_toml("").unwrap();
    assert_eq!(config, ToolConfig::default());
    assert_eq!(config.writer.line_width, 80);
    assert_eq!(config.explorer.sample_size, 5);
}

#[test]
fn test_partial_sections_keep_other_defaults() {
    let config = ToolConfig::from_toml(
        r#"
        [explorer]
        sample_size = 2
        max_ply = 12

        [writer]
        comments = false
        "#,
    )
    .unwrap();
    assert_eq!(config.explorer.sample_size, 2);
    assert_eq!(config.explorer.max_ply, Some(12));
    assert!(config.explorer.include_variations);
    assert!(!config.writer.comments);
    assert!(config.writer.variations);
    assert_eq!(config.writer.line_width, 80);
}

#[test]
fn test_bad_values_are_rejected() {
    assert!(ToolConfig::from_toml("[writer]\nline_width = \"wide\"").is_err());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let missing = Path::new("/nonexistent/pgn_tool.toml");
    let err = ToolConfig::resolve(Some(missing)).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}

#[test]
fn test_load_from_file() {
    let path = std::env::temp_dir().join(format!("pgn_tool_config_{}.toml", std::process::id()));
    std::fs::write(&path, "[writer]\nline_width = 0\n").unwrap();
    let config = ToolConfig::load(&path).unwrap();
    assert_eq!(config.writer.line_width, 0);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_sample_flag_overrides_file() {
    let config = ToolConfig::from_toml("[explorer]\nsample_size = 2\nmax_ply = 8\n").unwrap();
    assert_eq!(config.explorer_config(None).sample_size, 2);
    let explorer = config.explorer_config(Some(7));
    assert_eq!(explorer.sample_size, 7);
    assert_eq!(explorer.max_ply, Some(8));
}
