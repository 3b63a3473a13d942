//! Integration tests for the configuration schema
//!
//! Parses a realistic configuration of the kind a Python project would
//! carry and checks that every descriptor field survives the round trip
//! through discovery, loading, and validation.

#![allow(clippy::unwrap_used, clippy::panic)]

use sekisho_config::{Config, Language, RepoSource, Stage};

const REALISTIC: &str = r#"
repos:
  - repo: https://github.com/PyCQA/autoflake
    rev: v2.3.1
    hooks:
      - id: autoflake
        args:
          - --in-place
          - --remove-all-unused-imports
  - repo: https://github.com/asottile/pyupgrade
    rev: v3.19.1
    hooks:
      - id: pyupgrade
        args: [--py39-plus]
        exclude: ^tests/fixtures/
  - repo: https://github.com/PyCQA/flake8
    rev: 7.1.1
    hooks:
      - id: flake8
        additional_dependencies: [flake8-bugbear]
  - repo: https://github.com/PyCQA/isort
    rev: 5.13.2
    hooks:
      - id: isort
        require_serial: true
  - repo: https://github.com/pre-commit/mirrors-prettier
    rev: v3.1.0
    hooks:
      - id: prettier
        files: '\.(md|json|yaml|yml)$'
        exclude_types: [binary]
  - repo: https://github.com/psf/black
    rev: 24.10.0
    hooks:
      - id: black
        types: [python]
        stages: [pre-commit, pre-push]
  - repo: meta
    hooks:
      - id: check-useless-excludes
  - repo: local
    hooks:
      - id: forbid-env-files
        name: forbid committing .env files
        entry: .env files must not be committed
        language: fail
        files: '\.env$'

exclude: ^docs/generated/
fail_fast: false
"#;

#[test]
fn test_realistic_config_parses_and_validates() {
    let config = Config::from_yaml_str(REALISTIC).unwrap();
    config.validate().unwrap();

    assert_eq!(config.repos.len(), 8);
    assert_eq!(config.exclude, "^docs/generated/");

    let autoflake = &config.repos[0];
    assert_eq!(
        autoflake.repo,
        RepoSource::Remote("https://github.com/PyCQA/autoflake".to_string())
    );
    assert_eq!(autoflake.rev.as_deref(), Some("v2.3.1"));
    assert_eq!(autoflake.hooks[0].args.len(), 2);

    let flake8 = &config.repos[2].hooks[0];
    assert_eq!(flake8.additional_dependencies, vec!["flake8-bugbear"]);

    let isort = &config.repos[3].hooks[0];
    assert_eq!(isort.require_serial, Some(true));

    let prettier = &config.repos[4].hooks[0];
    assert_eq!(prettier.exclude_types, vec!["binary"]);

    let black = &config.repos[5].hooks[0];
    assert_eq!(
        black.stages.as_deref(),
        Some([Stage::PreCommit, Stage::PrePush].as_slice())
    );

    let local = &config.repos[7].hooks[0];
    assert_eq!(local.language, Some(Language::Fail));
}

#[test]
fn test_entry_order_is_preserved() {
    let config = Config::from_yaml_str(REALISTIC).unwrap();
    let ids: Vec<&str> = config
        .all_hooks()
        .map(|(_, hook)| hook.id.as_str())
        .collect();
    assert_eq!(
        ids,
        vec![
            "autoflake",
            "pyupgrade",
            "flake8",
            "isort",
            "prettier",
            "black",
            "check-useless-excludes",
            "forbid-env-files",
        ]
    );
}

#[test]
fn test_discovery_and_load_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".sekisho.yaml"), REALISTIC).unwrap();

    let path = Config::discover(dir.path()).unwrap();
    let config = Config::load(&path).unwrap();
    config.validate().unwrap();
    assert_eq!(config.repos.len(), 8);
}

#[test]
fn test_serialization_round_trip_preserves_pins() {
    let config = Config::from_yaml_str(REALISTIC).unwrap();
    let serialized = serde_yaml::to_string(&config).unwrap();
    let reparsed = Config::from_yaml_str(&serialized).unwrap();

    for (original, round_tripped) in config.repos.iter().zip(&reparsed.repos) {
        assert_eq!(original.rev, round_tripped.rev);
        assert_eq!(original.repo, round_tripped.repo);
    }
}
