//! # Configuração
//!
//! Opções do decodificador e da carga de datasets, com padrões sensatos e
//! carga opcional a partir de um arquivo JSON. Campos ausentes no arquivo
//! assumem o valor padrão.
//!
//! ```json
//! {
//!   "decode": { "word_offsets": "whitespace_approx", "check_predictions": true },
//!   "dataset": { "offset_unit": "char", "strict_values": true }
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

/// Como obter offsets de caracteres quando o decodificador só recebe as
/// strings dos tokens (sem offsets do tokenizador).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMode {
    /// **Omitir**: os spans saem com `char_range = None`.
    Omit,
    /// **Aproximar por espaços**: soma os comprimentos dos tokens mais um
    /// separador por intervalo, como se o texto fosse os tokens unidos por um
    /// único espaço. Errado para espaços múltiplos, pontuação colada ao token
    /// e escritas sem espaço entre palavras.
    WhitespaceApprox,
}

impl Default for OffsetMode {
    fn default() -> Self {
        OffsetMode::Omit
    }
}

/// Unidade dos offsets gravados num dataset JSONL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetUnit {
    /// Índices de byte UTF-8 (unidade interna do crate).
    Byte,
    /// Índices de caractere (code points), como produzidos por ferramentas
    /// que indexam strings por caractere. Convertidos para bytes na carga.
    Char,
}

impl Default for OffsetUnit {
    fn default() -> Self {
        OffsetUnit::Byte
    }
}

/// Opções do [`SpanDecoder`](crate::decoder::SpanDecoder).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeConfig {
    /// Offsets para a entrada só com strings de tokens.
    pub word_offsets: OffsetMode,
    /// Roda o validador sobre as predições e registra violações em `warn`.
    /// Nunca impede a decodificação.
    pub check_predictions: bool,
}

/// Opções de carga de exemplos de treino.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub offset_unit: OffsetUnit,
    /// Exige que o `value` de cada span seja idêntico ao trecho do texto.
    pub strict_values: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            offset_unit: OffsetUnit::Byte,
            strict_values: true,
        }
    }
}

/// Configuração completa do crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignConfig {
    pub decode: DecodeConfig,
    pub dataset: DatasetConfig,
}

impl AlignConfig {
    /// Parseia a configuração de uma string JSON.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| SlotError::json("configuração", e))
    }

    /// Carrega a configuração de um arquivo JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SlotError::io(path, e))?;
        serde_json::from_str(&content)
            .map_err(|e| SlotError::json(path.display().to_string(), e))
    }
}
