// tests/scenarios.rs
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fs;
use std::io::BufWriter;
use std::sync::Arc;

use fillgen::constants::{MAX_TARGET_BYTES, ZERO_RUN};
use fillgen::{
    generate, generate_simple, generate_to_writer, spawn_generate, CancellationToken, ContentMode,
    Corpus, CorpusEntry, Format, GenerateError, GenerationRequest, GeneratorConfig, Phase, ProgressSnapshot,
    ValidationError,
};

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init();
}

fn zero_txt_tile() -> Vec<u8> {
    let mut tile = vec![b'0'; ZERO_RUN];
    tile.push(b'\n');
    tile
}

#[test]
fn txt_zero_1024_is_pure_tiling() {
    init_tracing();
    let result = generate_simple(1024, Format::Txt, ContentMode::Zero).unwrap();
    assert_eq!(result.len(), 1024);
    assert_eq!(result.mime_type(), "text/plain; charset=utf-8");

    let tile = zero_txt_tile();
    for (i, &b) in result.data().iter().enumerate() {
        assert_eq!(b, tile[i % tile.len()], "byte {}", i);
    }
}

#[test]
fn csv_zero_100_has_header_then_zeros() {
    init_tracing();
    let result = generate_simple(100, Format::Csv, ContentMode::Zero).unwrap();
    let data = result.data();
    assert_eq!(data.len(), 100);
    assert!(data.starts_with(b"value\n"));
    assert!(data[6..].iter().all(|&b| b == b'0'));
}

#[test]
fn oversized_target_is_rejected() {
    let err = generate_simple(MAX_TARGET_BYTES + 1, Format::Txt, ContentMode::Random).unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(
        err,
        GenerateError::Validation(ValidationError::TooLarge { .. })
    ));
}

#[test]
fn zero_target_is_rejected() {
    let err = generate_simple(0, Format::Json, ContentMode::Curated).unwrap_err();
    assert!(matches!(
        err,
        GenerateError::Validation(ValidationError::TooSmall { requested: 0, min: 1 })
    ));
}

#[test]
fn cancel_after_first_progress_callback() {
    init_tracing();
    let request = GenerationRequest::new(10 * 1024 * 1024, Format::Json, ContentMode::Random).unwrap();
    let token = CancellationToken::new();
    let mut calls = 0;

    let outcome = generate(
        &request,
        &Corpus::builtin(),
        &GeneratorConfig::default(),
        |_: &ProgressSnapshot| {
            calls += 1;
            token.cancel();
        },
        &token,
    );

    assert!(outcome.as_ref().err().is_some_and(GenerateError::is_cancelled));
    assert_eq!(calls, 1);
}

#[test]
fn one_byte_and_tile_boundaries() {
    init_tracing();
    for format in Format::ALL {
        for mode in ContentMode::ALL {
            let result = generate_simple(1, format, mode).unwrap();
            assert_eq!(result.len(), 1, "{} {}", format, mode);
        }
    }

    let tile = zero_txt_tile();
    let exact = generate_simple(tile.len() as u64, Format::Txt, ContentMode::Zero).unwrap();
    assert_eq!(&exact.data()[..], &tile[..]);

    let short = generate_simple(tile.len() as u64 - 1, Format::Txt, ContentMode::Zero).unwrap();
    assert_eq!(&short.data()[..], &tile[..tile.len() - 1]);
}

#[test]
fn json_output_parses_at_every_size() {
    init_tracing();
    let config = GeneratorConfig {
        chunk_size: Some(1024),
        seed: Some(2024),
        ..Default::default()
    };
    for mode in ContentMode::ALL {
        for size in [2u64, 3, 50, 257, 1000, 4096, 65_537] {
            let request = GenerationRequest::new(size, Format::Json, mode).unwrap();
            let result = generate(
                &request,
                &Corpus::builtin(),
                &config,
                |_: &ProgressSnapshot| {},
                &CancellationToken::new(),
            )
            .unwrap();
            assert_eq!(result.len() as u64, size);
            let value: serde_json::Value = serde_json::from_slice(result.data())
                .unwrap_or_else(|e| panic!("{} json at {} bytes: {}", mode, size, e));
            assert!(value.is_array());
        }
    }
}

/// Parse one CSV line as a sequence of quoted fields
fn quoted_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut rest = line;
    loop {
        rest = rest.strip_prefix('"')?;
        let mut field = String::new();
        loop {
            let end = rest.find('"')?;
            field.push_str(&rest[..end]);
            rest = &rest[end + 1..];
            match rest.strip_prefix('"') {
                Some(after) => {
                    field.push('"');
                    rest = after;
                }
                None => break,
            }
        }
        fields.push(field);
        if rest.is_empty() {
            return Some(fields);
        }
        rest = rest.strip_prefix(',')?;
    }
}

#[test]
fn csv_curated_from_empty_entry_stays_well_formed() {
    init_tracing();
    let corpus = Corpus::new(vec![CorpusEntry::new("e", "", "")]);

    for size in [120u64, 121, 157, 500, 4096] {
        let request = GenerationRequest::new(size, Format::Csv, ContentMode::Curated).unwrap();
        let result = generate(
            &request,
            &corpus,
            &GeneratorConfig::default(),
            |_: &ProgressSnapshot| {},
            &CancellationToken::new(),
        )
        .unwrap();
        assert_eq!(result.len() as u64, size);

        let text = std::str::from_utf8(result.data()).unwrap();
        let body = text.strip_prefix("title,content\n").unwrap();
        let records: Vec<&str> = body.lines().filter(|l| !l.is_empty()).collect();
        assert!(!records.is_empty(), "size {}", size);
        for line in records {
            let fields = quoted_fields(line)
                .unwrap_or_else(|| panic!("malformed record {:?} at size {}", line, size));
            assert_eq!(fields.len(), 2, "record {:?}", line);
            assert_eq!(fields[0], "");
            assert!(!fields[1].is_empty());
        }
    }
}

#[test]
fn curated_selection_and_custom_corpus() {
    init_tracing();
    let corpus = Corpus::from_json(
        r#"[
            {"id": "a", "title": "Alpha", "text": "First entry"},
            {"id": "b", "title": "Beta", "text": "Second entry"}
        ]"#,
    )
    .unwrap();

    let request = GenerationRequest::new(500, Format::Txt, ContentMode::Curated)
        .unwrap()
        .with_selection(["b"]);
    let result = generate(
        &request,
        &corpus,
        &GeneratorConfig::default(),
        |_: &ProgressSnapshot| {},
        &CancellationToken::new(),
    )
    .unwrap();
    assert!(result.data().starts_with(b"Title: Beta\nContent: Second entry\n---\n"));

    let missing = GenerationRequest::new(500, Format::Txt, ContentMode::Curated)
        .unwrap()
        .with_selection(["zzz"]);
    let err = generate(
        &missing,
        &corpus,
        &GeneratorConfig::default(),
        |_: &ProgressSnapshot| {},
        &CancellationToken::new(),
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn writer_output_to_file_matches_buffer() {
    init_tracing();
    let config = GeneratorConfig {
        chunk_size: Some(4096),
        seed: Some(5),
        ..Default::default()
    };
    let request = GenerationRequest::new(123_457, Format::Xml, ContentMode::Curated).unwrap();

    let file = tempfile::NamedTempFile::new().unwrap();
    let written = generate_to_writer(
        &request,
        &Corpus::builtin(),
        &config,
        BufWriter::new(file.as_file()),
        |_: &ProgressSnapshot| {},
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(written, 123_457);

    let on_disk = fs::read(file.path()).unwrap();
    let in_memory = generate(
        &request,
        &Corpus::builtin(),
        &config,
        |_: &ProgressSnapshot| {},
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(&on_disk[..], &in_memory.data()[..]);
    assert!(on_disk.starts_with(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<entries>\n"));
    assert!(on_disk.ends_with(b"</entries>\n"));
}

#[test]
fn background_generation_can_be_cancelled() {
    init_tracing();
    let request = GenerationRequest::new(256 * 1024, Format::Csv, ContentMode::Random).unwrap();
    let config = GeneratorConfig {
        chunk_size: Some(1024),
        progress_interval: 1024,
        max_threads: Some(1),
        ..Default::default()
    };
    let handle = spawn_generate(request, Arc::new(Corpus::builtin()), config).unwrap();
    let token = handle.cancellation_token();

    let mut phases = Vec::new();
    for snapshot in handle.progress().iter() {
        phases.push(snapshot.phase);
        if snapshot.phase == Phase::Generating {
            token.cancel();
        }
    }

    assert_eq!(phases.first(), Some(&Phase::Preparing));
    match handle.join() {
        Err(GenerateError::Cancelled { produced, total }) => {
            assert!(produced < total);
            assert!(!phases.contains(&Phase::Complete));
        }
        // Generation may finish before the cancel lands
        Ok(result) => assert_eq!(result.len(), 256 * 1024),
        Err(other) => panic!("unexpected error: {}", other),
    }
}
