//! Propriedades do alinhamento sobre frases geradas.
//!
//! As frases são segmentos de palavras unidos por um espaço; cada segmento
//! pode ser anotado como uma menção de slot. Menções nunca se sobrepõem.

use std::collections::BTreeMap;

use proptest::prelude::*;
use slot_core::{decode, encode_slot_spans, validate_ids, LabelScheme, SlotSpan, Token};

const WORDS: &[&str] = &[
    "irrigate", "wheat", "in", "Jaipur", "paddy", "next", "week", "flowering", "गेहूं", "पानी",
    "水稻",
];
const SLOTS: &[&str] = &["crop", "date", "location", "stage"];

type Segments = Vec<(Vec<&'static str>, Option<&'static str>)>;

fn segments() -> impl Strategy<Value = Segments> {
    prop::collection::vec(
        (
            prop::collection::vec(prop::sample::select(WORDS), 1..4),
            prop::option::of(prop::sample::select(SLOTS)),
        ),
        0..8,
    )
}

/// Monta texto, tokens com offsets e as menções anotadas.
fn build(segments: &Segments) -> (String, Vec<Token>, Vec<SlotSpan>) {
    let mut text = String::new();
    let mut tokens = Vec::new();
    let mut spans = Vec::new();

    for (words, slot) in segments {
        let mut segment_start = None;
        for word in words {
            if !text.is_empty() {
                text.push(' ');
            }
            let start = text.len();
            text.push_str(word);
            tokens.push(Token::new(*word, start, text.len()));
            segment_start.get_or_insert(start);
        }
        if let (Some(slot), Some(start)) = (slot, segment_start) {
            spans.push(SlotSpan {
                slot: slot.to_string(),
                start,
                end: text.len(),
                value: text[start..].to_string(),
            });
        }
    }
    (text, tokens, spans)
}

fn scheme() -> LabelScheme {
    LabelScheme::build(SLOTS.iter().copied()).unwrap()
}

fn values_by_slot(spans: &[SlotSpan]) -> BTreeMap<String, Vec<String>> {
    let mut values: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for span in spans {
        values.entry(span.slot.clone()).or_default().push(span.value.clone());
    }
    values
}

proptest! {
    #[test]
    fn round_trip_recovers_every_mention(segs in segments()) {
        let (text, tokens, spans) = build(&segs);
        let scheme = scheme();

        let ids = encode_slot_spans(&text, &tokens, &spans, &scheme).unwrap();
        prop_assert_eq!(ids.len(), tokens.len());
        prop_assert!(validate_ids(&tokens, &ids, &scheme).is_ok());

        let decoded = decode(&tokens, &ids, &scheme);
        let values: BTreeMap<String, Vec<String>> = decoded
            .iter()
            .map(|(slot, found)| (slot.clone(), found.iter().map(|s| s.value.clone()).collect()))
            .collect();
        prop_assert_eq!(values, values_by_slot(&spans));

        for span in decoded.values().flatten() {
            let (start, end) = span.char_range.unwrap();
            prop_assert_eq!(&text[start..end], span.value.as_str());
        }
    }

    #[test]
    fn encoding_ignores_input_order(segs in segments()) {
        let (text, tokens, mut spans) = build(&segs);
        let forward = scheme();
        let backward = LabelScheme::build(SLOTS.iter().rev().copied()).unwrap();

        let first = encode_slot_spans(&text, &tokens, &spans, &forward).unwrap();
        spans.reverse();
        let second = encode_slot_spans(&text, &tokens, &spans, &backward).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn reencoding_decoded_mentions_is_stable(segs in segments()) {
        let (text, tokens, spans) = build(&segs);
        let scheme = scheme();

        let ids = encode_slot_spans(&text, &tokens, &spans, &scheme).unwrap();
        let decoded = decode(&tokens, &ids, &scheme);
        prop_assert_eq!(&decoded, &decode(&tokens, &ids, &scheme));

        let again: Vec<SlotSpan> = decoded
            .values()
            .flatten()
            .map(|s| {
                let (start, end) = s.char_range.unwrap();
                SlotSpan::from_text(s.slot.clone(), &text, start, end).unwrap()
            })
            .collect();
        prop_assert_eq!(encode_slot_spans(&text, &tokens, &again, &scheme).unwrap(), ids);
    }
}
