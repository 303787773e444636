use std::io;
use std::path::Path;
use tokenizers::Tokenizer;

/// Loads `tokenizer.json` from a snapshot directory.
pub fn load_tokenizer(snapshot_dir: &Path) -> io::Result<Tokenizer> {
    Tokenizer::from_file(snapshot_dir.join("tokenizer.json")).map_err(io::Error::other)
}

/// Loads a tokenizer with truncation enabled for a maximum sequence length.
///
/// Cross-encoder and embedding models both have a fixed maximum sequence
/// length; inputs exceeding `max_len` are truncated to fit.
pub fn load_tokenizer_with_truncation(snapshot_dir: &Path, max_len: usize) -> io::Result<Tokenizer> {
    use tokenizers::TruncationParams;

    let mut tokenizer = load_tokenizer(snapshot_dir)?;

    let truncation = TruncationParams {
        max_length: max_len,
        ..Default::default()
    };

    tokenizer
        .with_truncation(Some(truncation))
        .map_err(|e| io::Error::other(format!("Failed to configure truncation: {e}")))?;

    Ok(tokenizer)
}
