#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use graphql_envelope::{
    DocumentCompiler, Error, HashProvider, ParserOptions, Result, Sha256HashProvider,
};
use smol_str::SmolStr;

/// Compiles to the unescaped query text, so tests can compare documents
/// against the expected source directly.
pub struct TextCompiler;

impl DocumentCompiler for TextCompiler {
    type Document = String;

    fn compile(&self, query: &[u8], _options: &ParserOptions) -> Result<String> {
        Ok(String::from_utf8_lossy(query).into_owned())
    }
}

/// Like [`TextCompiler`], but counts invocations.
#[derive(Default)]
pub struct CountingCompiler {
    calls: AtomicUsize,
}

impl CountingCompiler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DocumentCompiler for CountingCompiler {
    type Document = String;

    fn compile(&self, query: &[u8], _options: &ParserOptions) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(String::from_utf8_lossy(query).into_owned())
    }
}

pub struct FailingCompiler;

impl DocumentCompiler for FailingCompiler {
    type Document = String;

    fn compile(&self, _query: &[u8], _options: &ParserOptions) -> Result<String> {
        Err(Error::upstream("document compiler rejected the query"))
    }
}

/// Delegates to SHA-256 while recording every input it was asked to
/// fingerprint.
#[derive(Default)]
pub struct RecordingHashProvider {
    inputs: Mutex<Vec<Vec<u8>>>,
}

impl RecordingHashProvider {
    pub fn inputs(&self) -> Vec<Vec<u8>> {
        self.inputs.lock().unwrap().clone()
    }
}

impl HashProvider for RecordingHashProvider {
    fn fingerprint(&self, query: &[u8]) -> Result<SmolStr> {
        self.inputs.lock().unwrap().push(query.to_vec());
        Sha256HashProvider.fingerprint(query)
    }
}

pub struct FailingHashProvider;

impl HashProvider for FailingHashProvider {
    fn fingerprint(&self, _query: &[u8]) -> Result<SmolStr> {
        Err(Error::upstream("hash provider unavailable"))
    }
}
