//! # Tokens e Spans
//!
//! Tipos de dados trocados entre o tokenizador externo, o codificador e o
//! decodificador.
//!
//! Todos os offsets são **índices de byte** UTF-8 no texto original, em
//! intervalos semiabertos `[start, end)`. Isso permite fatiar o `&str` de
//! origem diretamente (`&text[start..end]`).
//!
//! ```text
//! texto:   "irrigate wheat in Jaipur"
//! tokens:   [0,8)   [9,14) [15,17) [18,24)
//! span:            crop = [9,14) "wheat"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};
use crate::scheme::LabelScheme;

/// Um token produzido pelo tokenizador externo.
///
/// O crate não tokeniza texto: recebe os tokens prontos, em ordem, sem
/// sobreposição e com offsets monotonicamente crescentes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// O texto do token (ex: "wheat").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusivo).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Sobreposição em intervalos semiabertos: o token toca o span se não
    /// terminar antes dele nem começar depois dele.
    pub fn overlaps(&self, span: &CharSpan) -> bool {
        !(self.end <= span.start || span.end <= self.start)
    }
}

/// Par de offsets de um span, sem o nome do slot nem o valor.
///
/// É a forma que o codificador consome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharSpan {
    pub start: usize,
    pub end: usize,
}

impl CharSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Verifica se o span é utilizável sobre `text`.
    ///
    /// Regras: largura positiva (`start < end`), dentro do texto
    /// (`end <= text.len()`) e com as duas pontas em fronteiras de caractere
    /// UTF-8.
    pub fn check(&self, slot: &str, text: &str) -> Result<()> {
        if self.start >= self.end {
            return Err(SlotError::invalid_span(
                slot,
                self.start,
                self.end,
                "largura não positiva",
            ));
        }
        if self.end > text.len() {
            return Err(SlotError::invalid_span(
                slot,
                self.start,
                self.end,
                format!("fim além do texto ({} bytes)", text.len()),
            ));
        }
        if !text.is_char_boundary(self.start) || !text.is_char_boundary(self.end) {
            return Err(SlotError::invalid_span(
                slot,
                self.start,
                self.end,
                "offset no meio de um caractere UTF-8",
            ));
        }
        Ok(())
    }
}

/// Uma ocorrência anotada de um slot no texto.
///
/// Invariante: `0 <= start < end <= text.len()` e `&text[start..end] == value`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSpan {
    pub slot: String,
    pub start: usize,
    pub end: usize,
    pub value: String,
}

impl SlotSpan {
    /// Cria o span recortando o valor do próprio texto.
    pub fn from_text(slot: impl Into<String>, text: &str, start: usize, end: usize) -> Result<Self> {
        let slot = slot.into();
        CharSpan::new(start, end).check(&slot, text)?;
        Ok(Self {
            value: text[start..end].to_string(),
            slot,
            start,
            end,
        })
    }

    pub fn char_span(&self) -> CharSpan {
        CharSpan::new(self.start, self.end)
    }

    /// Verifica limites e que o valor anotado confere com o texto.
    pub fn check(&self, text: &str) -> Result<()> {
        self.char_span().check(&self.slot, text)?;
        let actual = &text[self.start..self.end];
        if actual != self.value {
            return Err(SlotError::invalid_span(
                &self.slot,
                self.start,
                self.end,
                format!("valor '{}' difere do texto '{}'", self.value, actual),
            ));
        }
        Ok(())
    }
}

/// Tokens pareados 1:1 com ids de rótulo, pronto para o treino do modelo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabeledSequence {
    pub tokens: Vec<Token>,
    pub labels: Vec<usize>,
}

impl LabeledSequence {
    pub fn new(tokens: Vec<Token>, labels: Vec<usize>) -> Result<Self> {
        if tokens.len() != labels.len() {
            return Err(SlotError::LengthMismatch {
                tokens: tokens.len(),
                labels: labels.len(),
            });
        }
        Ok(Self { tokens, labels })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Rótulos em forma textual (ex: `["O", "B-crop"]`), úteis para depuração.
    pub fn label_strings<'s>(&self, scheme: &'s LabelScheme) -> Vec<&'s str> {
        self.labels
            .iter()
            .map(|&id| scheme.label_of(id).unwrap_or("O"))
            .collect()
    }
}

/// Tokeniza por espaços preservando offsets; só para os testes do crate.
#[cfg(test)]
pub(crate) fn whitespace_tokens(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_start: Option<usize> = None;

    for (byte_pos, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(start) = current_start.take() {
                tokens.push(Token::new(&text[start..byte_pos], start, byte_pos));
            }
        } else if current_start.is_none() {
            current_start = Some(byte_pos);
        }
    }
    if let Some(start) = current_start {
        tokens.push(Token::new(&text[start..], start, text.len()));
    }
    tokens
}
