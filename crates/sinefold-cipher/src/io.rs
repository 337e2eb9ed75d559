//! Whole-file transform helpers

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cipher::SineScramble;
use crate::error::Result;
use crate::precomputed::PrecomputedScramble;

impl SineScramble {
    /// Read a file, encrypt its contents, write the ciphertext
    pub fn encrypt_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let data = fs::read(input.as_ref())?;
        let encrypted = self.encrypt(&data)?;
        debug!(bytes = data.len(), "encrypted file contents");
        fs::write(output.as_ref(), encrypted)?;
        Ok(())
    }

    /// Read an encrypted file, decrypt its contents, write the plaintext
    pub fn decrypt_file(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<()> {
        let data = fs::read(input.as_ref())?;
        let decrypted = self.decrypt(&data)?;
        debug!(bytes = data.len(), "decrypted file contents");
        fs::write(output.as_ref(), decrypted)?;
        Ok(())
    }

    /// Encrypt a file in independent fixed-size chunks
    ///
    /// Full chunks share one set of precomputed round tables; only the
    /// trailing partial chunk (if any) pays its own table derivation.
    /// Decryption must use the same `chunk_size`.
    pub fn encrypt_file_chunked(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        chunk_size: usize,
    ) -> Result<()> {
        self.transform_file_chunked(input.as_ref(), output.as_ref(), chunk_size, false)
    }

    /// Decrypt a file produced by
    /// [`encrypt_file_chunked`](Self::encrypt_file_chunked) with the same
    /// `chunk_size`
    pub fn decrypt_file_chunked(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        chunk_size: usize,
    ) -> Result<()> {
        self.transform_file_chunked(input.as_ref(), output.as_ref(), chunk_size, true)
    }

    fn transform_file_chunked(
        &self,
        input: &Path,
        output: &Path,
        chunk_size: usize,
        inverse: bool,
    ) -> Result<()> {
        let data = fs::read(input)?;
        let mut out = Vec::with_capacity(data.len());

        let mut full_chunks = data.chunks_exact(chunk_size.max(1));
        let mut precomputed: Option<PrecomputedScramble> = None;
        for chunk in &mut full_chunks {
            if precomputed.is_none() {
                precomputed = Some(PrecomputedScramble::new(self.clone(), chunk.len())?);
            }
            if let Some(tables) = &precomputed {
                let transformed = if inverse {
                    tables.decrypt_block(chunk)?
                } else {
                    tables.encrypt_block(chunk)?
                };
                out.extend(transformed);
            }
        }

        let tail = full_chunks.remainder();
        if !tail.is_empty() {
            let transformed = if inverse {
                self.decrypt(tail)?
            } else {
                self.encrypt(tail)?
            };
            out.extend(transformed);
        }

        debug!(bytes = data.len(), chunk_size, "transformed file in chunks");
        fs::write(output, out)?;
        Ok(())
    }
}
