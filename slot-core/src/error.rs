//! # Erros do Alinhamento
//!
//! Todos os módulos do crate devolvem [`SlotError`]. A política é simples:
//! erros de esquema e de codificação interrompem a chamada imediatamente
//! (dado de treino ruim não pode virar rótulo ruidoso em silêncio), enquanto a
//! decodificação de predições nunca falha.

use std::path::PathBuf;

use thiserror::Error;

/// Erros que podem ocorrer ao construir esquemas, codificar spans,
/// validar sequências BIO ou ler/gravar artefatos.
#[derive(Error, Debug)]
pub enum SlotError {
    /// Nome de slot vazio, duplicado, ausente do esquema ou lista de rótulos
    /// que não segue a ordem canônica.
    #[error("Esquema inválido: {0}")]
    Schema(String),

    /// Span de caracteres fora dos limites do texto, com largura não positiva
    /// ou cujo valor não confere com o trecho do texto.
    #[error("Span inválido para o slot '{slot}' ({start}..{end}): {reason}")]
    InvalidSpan {
        slot: String,
        start: usize,
        end: usize,
        reason: String,
    },

    /// Número de tokens diferente do número de rótulos.
    #[error("Quantidade divergente: {tokens} tokens para {labels} rótulos")]
    LengthMismatch { tokens: usize, labels: usize },

    /// Violação das regras de boa formação BIO.
    #[error("Sequência BIO inválida na posição {index}: esperado {expected}, encontrado {found}")]
    Validation {
        index: usize,
        expected: String,
        found: String,
    },

    /// O esquema salvo junto ao modelo não é o esquema esperado.
    #[error("Esquema de rótulos incompatível: esperado {expected:?}, encontrado {found:?}")]
    SchemeMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("Erro de E/S em {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON inválido em {context}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, SlotError>;

impl SlotError {
    pub(crate) fn invalid_span(
        slot: impl Into<String>,
        start: usize,
        end: usize,
        reason: impl Into<String>,
    ) -> Self {
        SlotError::InvalidSpan {
            slot: slot.into(),
            start,
            end,
            reason: reason.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SlotError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        SlotError::Json {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_carries_index_and_labels() {
        let err = SlotError::Validation {
            index: 0,
            expected: "B-crop".to_string(),
            found: "I-crop".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("posição 0"));
        assert!(msg.contains("B-crop"));
        assert!(msg.contains("I-crop"));
    }

    #[test]
    fn test_invalid_span_message() {
        let err = SlotError::invalid_span("crop", 10, 15, "fim além do texto");
        assert_eq!(
            err.to_string(),
            "Span inválido para o slot 'crop' (10..15): fim além do texto"
        );
    }

    #[test]
    fn test_json_cause_is_chained_not_repeated() {
        let cause = serde_json::from_str::<serde_json::Value>("{not json}").unwrap_err();
        let cause_msg = cause.to_string();
        let err = SlotError::json("linha 2", cause);

        assert_eq!(err.to_string(), "JSON inválido em linha 2");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), cause_msg);
    }

    #[test]
    fn test_io_cause_is_chained() {
        let cause = std::io::Error::new(std::io::ErrorKind::NotFound, "sem arquivo");
        let err = SlotError::io("labels.json", cause);

        assert_eq!(err.to_string(), "Erro de E/S em labels.json");
        assert!(std::error::Error::source(&err).is_some());
    }
}
