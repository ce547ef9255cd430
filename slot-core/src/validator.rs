//! # Validação de Sequências BIO
//!
//! Verifica se uma sequência de rótulos obedece às regras de boa formação do
//! esquema BIO. Serve de portão para dados de treino e, opcionalmente, de
//! diagnóstico sobre predições do modelo.
//!
//! O decodificador **não** depende desta validação: ele recupera sequências
//! malformadas por conta própria (ver [`crate::decoder`]).
//!
//! Verificações, nesta ordem, parando na primeira falha:
//! 1. `len(tokens) == len(labels)`
//! 2. o rótulo da posição 0 não é `I-*`
//! 3. todo `I-<slot>` na posição `i` segue `B-<slot>` ou `I-<slot>` do mesmo slot

use crate::error::{Result, SlotError};
use crate::scheme::{Label, LabelScheme};

/// Valida rótulos em forma textual.
///
/// `tokens` pode ser qualquer sequência (tokens com offsets ou apenas
/// strings); só o comprimento importa.
///
/// Rótulos que não parseiam como `O`, `B-<slot>` ou `I-<slot>` também são
/// reportados como [`SlotError::Validation`].
pub fn validate<T, S>(tokens: &[T], labels: &[S]) -> Result<()>
where
    S: AsRef<str>,
{
    if tokens.len() != labels.len() {
        return Err(SlotError::LengthMismatch {
            tokens: tokens.len(),
            labels: labels.len(),
        });
    }

    let mut prev: Option<Label> = None;
    for (index, raw) in labels.iter().enumerate() {
        let raw = raw.as_ref();
        let label = Label::from_label(raw).ok_or_else(|| SlotError::Validation {
            index,
            expected: "O, B-<slot> ou I-<slot>".to_string(),
            found: raw.to_string(),
        })?;

        if !Label::is_valid_transition(prev.as_ref(), &label) {
            // Só I- pode violar a transição; o rótulo válido ali seria o B-
            let slot = label.slot().unwrap_or_default();
            return Err(SlotError::Validation {
                index,
                expected: Label::Begin(slot.to_string()).label(),
                found: raw.to_string(),
            });
        }
        prev = Some(label);
    }
    Ok(())
}

/// Valida rótulos em forma de id, traduzindo-os pelo `scheme`.
///
/// Ids fora do esquema são reportados como [`SlotError::Validation`].
pub fn validate_ids<T>(tokens: &[T], ids: &[usize], scheme: &LabelScheme) -> Result<()> {
    if tokens.len() != ids.len() {
        return Err(SlotError::LengthMismatch {
            tokens: tokens.len(),
            labels: ids.len(),
        });
    }

    let labels = ids
        .iter()
        .enumerate()
        .map(|(index, &id)| {
            scheme.label_of(id).ok_or_else(|| SlotError::Validation {
                index,
                expected: format!("id menor que {}", scheme.num_labels()),
                found: id.to_string(),
            })
        })
        .collect::<Result<Vec<&str>>>()?;

    validate(tokens, &labels)
}
