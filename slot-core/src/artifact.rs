//! # Artefato do Esquema
//!
//! A ordem dos rótulos é o contrato de saída do modelo: o id `k` previsto
//! pela rede só significa algo com o mesmo esquema usado no treino. Por isso
//! o esquema é gravado ao lado do checkpoint e conferido na carga. Um esquema
//! divergente é erro, nunca remapeamento silencioso.
//!
//! Formatos aceitos na leitura:
//! - lista: `{"slot_labels": ["O", "B-crop", "I-crop"]}` (o formato gravado)
//! - mapa: `{"slot_to_id": {"O": 0, "B-crop": 1, "I-crop": 2}}`
//!
//! Outros campos no arquivo (ex: `intents`) são ignorados.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SlotError};
use crate::scheme::LabelScheme;

/// Nome padrão do arquivo dentro do diretório do modelo.
pub const SCHEME_FILE: &str = "labels.json";

#[derive(Serialize)]
struct SchemeArtifact<'a> {
    slot_labels: &'a [String],
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredScheme {
    List { slot_labels: Vec<String> },
    Map { slot_to_id: HashMap<String, usize> },
}

/// Serializa o esquema no formato de artefato.
pub fn scheme_to_json(scheme: &LabelScheme) -> Result<String> {
    let artifact = SchemeArtifact {
        slot_labels: scheme.labels(),
    };
    serde_json::to_string_pretty(&artifact).map_err(|e| SlotError::json("artefato do esquema", e))
}

/// Lê um esquema de qualquer um dos formatos aceitos.
pub fn scheme_from_json(content: &str) -> Result<LabelScheme> {
    let stored: StoredScheme =
        serde_json::from_str(content).map_err(|e| SlotError::json("artefato do esquema", e))?;
    match stored {
        StoredScheme::List { slot_labels } => LabelScheme::from_labels(slot_labels),
        StoredScheme::Map { slot_to_id } => LabelScheme::from_label_map(&slot_to_id),
    }
}

/// Grava o esquema em `path`.
pub fn save_scheme(path: impl AsRef<Path>, scheme: &LabelScheme) -> Result<()> {
    let path = path.as_ref();
    let json = scheme_to_json(scheme)?;
    std::fs::write(path, json).map_err(|e| SlotError::io(path, e))?;
    info!(path = %path.display(), labels = scheme.num_labels(), "esquema salvo");
    Ok(())
}

/// Carrega o esquema de `path`.
pub fn load_scheme(path: impl AsRef<Path>) -> Result<LabelScheme> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| SlotError::io(path, e))?;
    let scheme = scheme_from_json(&content)?;
    info!(path = %path.display(), labels = scheme.num_labels(), "esquema carregado");
    Ok(scheme)
}

/// Carrega o esquema de `path` e exige que seja idêntico a `expected`.
pub fn load_scheme_checked(path: impl AsRef<Path>, expected: &LabelScheme) -> Result<LabelScheme> {
    let found = load_scheme(path)?;
    ensure_compatible(expected, &found)?;
    Ok(found)
}

/// Falha com [`SlotError::SchemeMismatch`] se os esquemas diferirem.
pub fn ensure_compatible(expected: &LabelScheme, found: &LabelScheme) -> Result<()> {
    if expected.labels() != found.labels() {
        return Err(SlotError::SchemeMismatch {
            expected: expected.labels().to_vec(),
            found: found.labels().to_vec(),
        });
    }
    Ok(())
}
