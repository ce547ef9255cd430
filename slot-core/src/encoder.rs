//! # Codificador de Spans → Rótulos BIO
//!
//! Direção de treino: converte spans de caracteres anotados no texto em uma
//! sequência de ids de rótulo, um por token.
//!
//! ## Algoritmo
//!
//! 1. Valida **todos** os spans antes de rotular qualquer token (fail-fast).
//! 2. Percorre os slots na ordem do esquema (lexicográfica).
//! 3. Para cada span, o primeiro token que o sobrepõe recebe `B-<slot>` e os
//!    seguintes recebem `I-<slot>`. O marcador de "primeiro" é reiniciado a
//!    cada span, de modo que duas menções do mesmo slot numa frase começam
//!    cada uma com seu próprio `B-`.
//!    Um span que não cobre nenhum token (só espaços, ou além do último
//!    token) não rotula nada.
//! 4. Se spans de slots diferentes disputam o mesmo token, vence o slot
//!    processado por último (última escrita). Tokens com mais de um rótulo
//!    não são representados.
//!
//! ```text
//! "irrigate wheat and cotton"
//!  crop = [9,14) "wheat", [19,25) "cotton"
//!  →  O  B-crop  O  B-crop
//! ```

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{Result, SlotError};
use crate::scheme::LabelScheme;
use crate::token::{CharSpan, SlotSpan, Token};

/// Spans de caracteres agrupados por slot.
///
/// Um mapa ordenado: a iteração é reproduzível entre execuções e plataformas.
pub type SlotSpans = BTreeMap<String, Vec<CharSpan>>;

/// Codifica os spans de `slot_spans` em um id de rótulo por token.
///
/// Tokens não cobertos por nenhum span ficam com `O`.
///
/// # Erros
/// - [`SlotError::InvalidSpan`] se algum span tiver largura não positiva,
///   passar do fim de `text` ou cortar um caractere UTF-8.
/// - [`SlotError::Schema`] se algum slot não existir em `scheme`.
pub fn encode(
    text: &str,
    tokens: &[Token],
    slot_spans: &SlotSpans,
    scheme: &LabelScheme,
) -> Result<Vec<usize>> {
    for (slot, spans) in slot_spans {
        if scheme.begin_id(slot).is_none() {
            return Err(SlotError::Schema(format!(
                "slot '{slot}' ausente do esquema"
            )));
        }
        for span in spans {
            span.check(slot, text)?;
        }
    }

    let outside = scheme.o_id();
    let mut labels = vec![outside; tokens.len()];

    for slot in scheme.slots() {
        let Some(spans) = slot_spans.get(slot) else {
            continue;
        };
        let (Some(begin), Some(inside)) = (scheme.begin_id(slot), scheme.inside_id(slot)) else {
            continue;
        };

        for span in spans {
            let mut first = true;
            for (i, token) in tokens.iter().enumerate() {
                if !token.overlaps(span) {
                    continue;
                }
                if labels[i] != outside && scheme.slot_of(labels[i]) != Some(slot.as_str()) {
                    debug!(
                        token = i,
                        previous = scheme.label_of(labels[i]).unwrap_or("O"),
                        slot = %slot,
                        "token disputado por slots diferentes; prevalece o último"
                    );
                }
                labels[i] = if first { begin } else { inside };
                first = false;
            }
            if first {
                debug!(
                    slot = %slot,
                    start = span.start,
                    end = span.end,
                    "span não cobre nenhum token; ignorado"
                );
            }
        }
    }

    Ok(labels)
}

/// Agrupa [`SlotSpan`]s por slot, preservando a ordem de cada slot.
pub fn group_slot_spans(spans: &[SlotSpan]) -> SlotSpans {
    let mut grouped = SlotSpans::new();
    for span in spans {
        grouped
            .entry(span.slot.clone())
            .or_default()
            .push(span.char_span());
    }
    grouped
}

/// Variante de [`encode`] que recebe spans completos (slot, offsets, valor).
///
/// Além das verificações de [`encode`], exige que o `value` de cada span
/// seja exatamente `text[start..end]`.
pub fn encode_slot_spans(
    text: &str,
    tokens: &[Token],
    spans: &[SlotSpan],
    scheme: &LabelScheme,
) -> Result<Vec<usize>> {
    for span in spans {
        span.check(text)?;
    }
    encode(text, tokens, &group_slot_spans(spans), scheme)
}
