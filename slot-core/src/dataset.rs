//! # Exemplos de Treino
//!
//! Exemplos anotados no formato JSONL, uma linha por enunciado:
//!
//! ```json
//! {"text": "irrigate wheat in Jaipur", "intent": "irrigation_when",
//!  "slots": {"crop": [{"start": 9, "end": 14, "value": "wheat"}],
//!            "location": [{"start": 18, "end": 24, "value": "Jaipur"}]}}
//! ```
//!
//! Este módulo carrega e valida os exemplos, deriva o [`LabelScheme`] do
//! corpus e codifica lotes inteiros em paralelo. A tokenização fica a cargo
//! de quem chama, através do trait [`Tokenize`].

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{DatasetConfig, OffsetUnit};
use crate::encoder::{encode, SlotSpans};
use crate::error::{Result, SlotError};
use crate::scheme::LabelScheme;
use crate::token::{CharSpan, LabeledSequence, SlotSpan, Token};

/// Anotação de uma ocorrência de slot dentro de um exemplo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanAnnotation {
    pub start: usize,
    pub end: usize,
    #[serde(default)]
    pub value: String,
}

/// Um enunciado anotado.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Example {
    pub text: String,
    /// Intenção do enunciado; transportada, mas não usada pelo alinhamento.
    #[serde(default)]
    pub intent: String,
    /// Ocorrências por slot, na ordem anotada.
    #[serde(default)]
    pub slots: BTreeMap<String, Vec<SpanAnnotation>>,
}

impl Example {
    /// Verifica limites de todos os spans e, com `strict_values`, que o
    /// `value` anotado é exatamente o trecho do texto.
    pub fn validate(&self, strict_values: bool) -> Result<()> {
        for (slot, spans) in &self.slots {
            for ann in spans {
                if strict_values {
                    SlotSpan {
                        slot: slot.clone(),
                        start: ann.start,
                        end: ann.end,
                        value: ann.value.clone(),
                    }
                    .check(&self.text)?;
                } else {
                    CharSpan::new(ann.start, ann.end).check(slot, &self.text)?;
                }
            }
        }
        Ok(())
    }

    /// Todos os spans do exemplo, slot a slot.
    pub fn slot_spans(&self) -> Vec<SlotSpan> {
        self.slots
            .iter()
            .flat_map(|(slot, spans)| {
                spans.iter().map(move |ann| SlotSpan {
                    slot: slot.clone(),
                    start: ann.start,
                    end: ann.end,
                    value: ann.value.clone(),
                })
            })
            .collect()
    }

    /// Offsets agrupados por slot, na forma que o codificador consome.
    pub fn char_spans(&self) -> SlotSpans {
        self.slots
            .iter()
            .map(|(slot, spans)| {
                let offsets = spans
                    .iter()
                    .map(|ann| CharSpan::new(ann.start, ann.end))
                    .collect();
                (slot.clone(), offsets)
            })
            .collect()
    }

    /// Converte offsets em caracteres (code points) para bytes UTF-8.
    fn into_byte_offsets(mut self) -> Result<Self> {
        // boundaries[c] = byte onde começa o caractere c; o último é text.len()
        let boundaries: Vec<usize> = self
            .text
            .char_indices()
            .map(|(b, _)| b)
            .chain(std::iter::once(self.text.len()))
            .collect();

        for (slot, spans) in self.slots.iter_mut() {
            for ann in spans.iter_mut() {
                match (boundaries.get(ann.start), boundaries.get(ann.end)) {
                    (Some(&start), Some(&end)) => {
                        ann.start = start;
                        ann.end = end;
                    }
                    _ => {
                        return Err(SlotError::invalid_span(
                            slot.as_str(),
                            ann.start,
                            ann.end,
                            format!(
                                "offset de caractere além do texto ({} caracteres)",
                                boundaries.len() - 1
                            ),
                        ))
                    }
                }
            }
        }
        Ok(self)
    }
}

/// Parseia exemplos JSONL, ignorando linhas em branco.
///
/// Cada exemplo é convertido para offsets de byte (se necessário) e validado
/// conforme `config`. Erros citam o número da linha (a partir de 1).
pub fn parse_examples(content: &str, config: &DatasetConfig) -> Result<Vec<Example>> {
    let mut examples = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let mut example: Example = serde_json::from_str(line)
            .map_err(|e| SlotError::json(format!("linha {}", line_no + 1), e))?;
        if config.offset_unit == OffsetUnit::Char {
            example = example.into_byte_offsets()?;
        }
        example.validate(config.strict_values)?;
        examples.push(example);
    }
    debug!(examples = examples.len(), "exemplos parseados");
    Ok(examples)
}

/// Carrega exemplos de um arquivo JSONL.
pub fn load_examples(path: impl AsRef<Path>, config: &DatasetConfig) -> Result<Vec<Example>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SlotError::io(path, e))?;
    let examples = parse_examples(&content, config)?;
    info!(path = %path.display(), examples = examples.len(), "dataset carregado");
    Ok(examples)
}

impl LabelScheme {
    /// Constrói o esquema com todos os slots que aparecem no corpus.
    pub fn from_examples(examples: &[Example]) -> Result<Self> {
        let names: BTreeSet<&str> = examples
            .iter()
            .flat_map(|ex| ex.slots.keys().map(String::as_str))
            .collect();
        Self::build(names)
    }
}

/// Tokenizador externo.
///
/// Implementado para qualquer `Fn(&str) -> Vec<Token>`, de modo que um
/// closure sobre a biblioteca de tokenização do modelo basta.
pub trait Tokenize {
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

impl<F> Tokenize for F
where
    F: Fn(&str) -> Vec<Token>,
{
    fn tokenize(&self, text: &str) -> Vec<Token> {
        self(text)
    }
}

/// Tokeniza e codifica um exemplo.
pub fn encode_example<T: Tokenize + ?Sized>(
    example: &Example,
    tokenizer: &T,
    scheme: &LabelScheme,
) -> Result<LabeledSequence> {
    let tokens = tokenizer.tokenize(&example.text);
    let labels = encode(&example.text, &tokens, &example.char_spans(), scheme)?;
    LabeledSequence::new(tokens, labels)
}

/// Codifica um lote de exemplos em paralelo.
///
/// Cada exemplo é independente; o esquema é apenas lido. Em caso de falha,
/// devolve o erro do primeiro exemplo inválido na ordem de entrada.
pub fn encode_batch<T: Tokenize + Sync + ?Sized>(
    examples: &[Example],
    tokenizer: &T,
    scheme: &LabelScheme,
) -> Result<Vec<LabeledSequence>> {
    let results: Vec<Result<LabeledSequence>> = examples
        .par_iter()
        .map(|example| encode_example(example, tokenizer, scheme))
        .collect();

    let sequences = results.into_iter().collect::<Result<Vec<_>>>()?;
    info!(sequences = sequences.len(), "lote codificado");
    Ok(sequences)
}
