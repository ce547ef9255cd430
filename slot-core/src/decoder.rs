//! # Decodificador BIO → Spans de Slots
//!
//! Direção de inferência: converte os ids de rótulo previstos pelo modelo,
//! um por token, de volta em spans de slots com o valor reconstruído.
//!
//! ## Máquina de estados
//!
//! Estado ∈ `{Fechado, Aberto(slot, início)}`, começando em `Fechado`:
//!
//! | rótulo     | ação                                                         |
//! |------------|--------------------------------------------------------------|
//! | `B-X`      | emite o span aberto (se houver) e abre `X` em `i`            |
//! | `I-X`      | se `X` está aberto, estende; senão trata como `B-X`          |
//! | `O`        | emite o span aberto e fecha                                  |
//! | fim        | emite o span aberto até o último token                       |
//!
//! A saída do modelo é ruidosa, então a decodificação nunca falha: um `I-`
//! órfão abre um span novo, ids fora do esquema são lidos como `O` e, se o
//! número de ids não bater com o de tokens, decodifica-se o prefixo comum.
//!
//! ## Offsets
//!
//! - [`SpanDecoder::decode`] recebe [`Token`]s com offsets e devolve
//!   `char_range` exato (`tokens[início].start .. tokens[fim - 1].end`).
//! - [`SpanDecoder::decode_words`] recebe só as strings. Por padrão
//!   `char_range` fica `None`; com [`OffsetMode::WhitespaceApprox`] os
//!   offsets são sintetizados supondo tokens unidos por um espaço. Essa
//!   aproximação não vale para escritas sem espaço entre palavras.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{DecodeConfig, OffsetMode};
use crate::scheme::LabelScheme;
use crate::token::Token;
use crate::validator::validate_ids;

/// Separador usado para unir os tokens de um span em seu valor.
pub const VALUE_SEPARATOR: &str = " ";

/// Uma ocorrência de slot reconstruída a partir dos rótulos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedSlotSpan {
    pub slot: String,
    /// Intervalo de tokens `[início, fim)`.
    pub token_range: (usize, usize),
    /// Textos dos tokens unidos por [`VALUE_SEPARATOR`].
    pub value: String,
    /// Intervalo de bytes no texto, quando disponível.
    pub char_range: Option<(usize, usize)>,
}

/// Spans decodificados agrupados por slot, na ordem em que aparecem.
pub type DecodedSlots = BTreeMap<String, Vec<DecodedSlotSpan>>;

/// Estado da máquina de decodificação.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DecodeState<'s> {
    Closed,
    Open { slot: &'s str, start: usize },
}

impl<'s> DecodeState<'s> {
    /// Emite o span aberto terminando em `end` (exclusivo) e fecha o estado.
    fn flush(&mut self, end: usize, out: &mut Vec<(&'s str, usize, usize)>) {
        if let DecodeState::Open { slot, start } = std::mem::replace(self, DecodeState::Closed) {
            out.push((slot, start, end));
        }
    }
}

/// Decodificador de predições BIO.
///
/// Apenas empresta o esquema; várias instâncias podem compartilhar o mesmo
/// [`LabelScheme`] em threads diferentes.
#[derive(Debug, Clone)]
pub struct SpanDecoder<'s> {
    scheme: &'s LabelScheme,
    config: DecodeConfig,
}

impl<'s> SpanDecoder<'s> {
    pub fn new(scheme: &'s LabelScheme) -> Self {
        Self {
            scheme,
            config: DecodeConfig::default(),
        }
    }

    pub fn with_config(scheme: &'s LabelScheme, config: DecodeConfig) -> Self {
        Self { scheme, config }
    }

    pub fn scheme(&self) -> &'s LabelScheme {
        self.scheme
    }

    /// Decodifica predições sobre tokens com offsets (caminho exato).
    pub fn decode(&self, tokens: &[Token], predicted: &[usize]) -> DecodedSlots {
        let ranges = self.token_ranges(tokens.len(), predicted);
        let mut slots = DecodedSlots::new();
        for (slot, start, end) in ranges {
            let window = &tokens[start..end];
            slots.entry(slot.to_string()).or_default().push(DecodedSlotSpan {
                slot: slot.to_string(),
                token_range: (start, end),
                value: join_values(window.iter().map(|t| t.text.as_str())),
                char_range: Some((window[0].start, window[window.len() - 1].end)),
            });
        }
        slots
    }

    /// Decodifica predições sobre tokens sem offsets.
    ///
    /// `char_range` segue `config.word_offsets`.
    pub fn decode_words<S: AsRef<str>>(&self, words: &[S], predicted: &[usize]) -> DecodedSlots {
        let ranges = self.token_ranges(words.len(), predicted);

        // prefix[k] = bytes de words[..k] unidos por um separador, sem o último
        let prefix: Option<Vec<usize>> = match self.config.word_offsets {
            OffsetMode::Omit => None,
            OffsetMode::WhitespaceApprox => {
                let mut sums = Vec::with_capacity(words.len() + 1);
                sums.push(0);
                for w in words {
                    let last = sums[sums.len() - 1];
                    sums.push(last + w.as_ref().len());
                }
                Some(sums)
            }
        };

        let mut slots = DecodedSlots::new();
        for (slot, start, end) in ranges {
            let char_range = prefix.as_ref().map(|sums| {
                let sep = VALUE_SEPARATOR.len();
                (sums[start] + start * sep, sums[end] + (end - 1) * sep)
            });
            slots.entry(slot.to_string()).or_default().push(DecodedSlotSpan {
                slot: slot.to_string(),
                token_range: (start, end),
                value: join_values(words[start..end].iter().map(|w| w.as_ref())),
                char_range,
            });
        }
        slots
    }

    /// Executa a máquina de estados e devolve `(slot, início, fim)` por span.
    fn token_ranges(&self, n_tokens: usize, predicted: &[usize]) -> Vec<(&'s str, usize, usize)> {
        let n = if n_tokens != predicted.len() {
            warn!(
                tokens = n_tokens,
                labels = predicted.len(),
                "quantidade de predições difere da de tokens; decodificando o prefixo comum"
            );
            n_tokens.min(predicted.len())
        } else {
            n_tokens
        };
        let predicted = &predicted[..n];

        if self.config.check_predictions {
            // o validador só usa o comprimento da sequência de tokens
            if let Err(err) = validate_ids(predicted, predicted, self.scheme) {
                warn!(error = %err, "predição BIO malformada; aplicando recuperação");
            }
        }

        let scheme = self.scheme;
        let mut state = DecodeState::Closed;
        let mut out = Vec::new();

        for (i, &id) in predicted.iter().enumerate() {
            let slot = match scheme.slot_of(id) {
                Some(slot) => slot,
                None => {
                    if id != scheme.o_id() {
                        debug!(position = i, id, "id fora do esquema lido como O");
                    }
                    state.flush(i, &mut out);
                    continue;
                }
            };

            if scheme.is_inside(id) {
                if let DecodeState::Open { slot: open, .. } = state {
                    if open == slot {
                        continue;
                    }
                }
                // I- órfão ou de outro slot: recupera como se fosse B-
            }
            state.flush(i, &mut out);
            state = DecodeState::Open { slot, start: i };
        }
        state.flush(n, &mut out);

        out
    }
}

/// Decodifica com opções padrão; atalho para [`SpanDecoder::decode`].
pub fn decode(tokens: &[Token], predicted: &[usize], scheme: &LabelScheme) -> DecodedSlots {
    SpanDecoder::new(scheme).decode(tokens, predicted)
}

fn join_values<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts.collect::<Vec<_>>().join(VALUE_SEPARATOR)
}
