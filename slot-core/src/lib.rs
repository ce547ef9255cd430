//! # slot-core — Alinhamento entre Spans de Slots e Rótulos BIO
//!
//! Este crate implementa o núcleo de preenchimento de slots de um assistente
//! de intenções: a conversão **bidirecional** entre duas representações da
//! mesma anotação.
//!
//! - **Spans de caracteres** sobre o texto bruto (supervisão de treino).
//! - **Rótulos BIO por token**, a representação que um modelo de marcação de
//!   sequências consome e emite.
//!
//! ## Arquitetura
//!
//! 1.  **Esquema** ([`scheme`]): vocabulário ordenado `O, B-x, I-x, ...` e o
//!     mapeamento rótulo ↔ id compartilhado entre treino e inferência.
//! 2.  **Codificação** ([`encoder`]): spans + offsets dos tokens → ids (treino).
//! 3.  **Validação** ([`validator`]): regras de boa formação BIO.
//! 4.  **Decodificação** ([`decoder`]): ids previstos → spans de slots
//!     (inferência), tolerante a sequências malformadas.
//!
//! Em volta do núcleo: [`dataset`] (exemplos JSONL e codificação em lote),
//! [`artifact`] (persistência do esquema junto ao modelo) e [`config`].
//!
//! A tokenização, o modelo neural e a normalização dos valores (gazetteers,
//! datas) ficam fora do crate.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use slot_core::{decode, encode, CharSpan, LabelScheme, SlotSpans, Token};
//!
//! let text = "irrigate wheat in Jaipur";
//! let tokens = vec![
//!     Token::new("irrigate", 0, 8),
//!     Token::new("wheat", 9, 14),
//!     Token::new("in", 15, 17),
//!     Token::new("Jaipur", 18, 24),
//! ];
//!
//! // 1. Esquema: O, B-crop, I-crop, B-location, I-location
//! let scheme = LabelScheme::build(["crop", "location"]).unwrap();
//!
//! // 2. Treino: spans de caracteres → ids por token
//! let mut spans = SlotSpans::new();
//! spans.insert("crop".to_string(), vec![CharSpan::new(9, 14)]);
//! spans.insert("location".to_string(), vec![CharSpan::new(18, 24)]);
//! let ids = encode(text, &tokens, &spans, &scheme).unwrap();
//! assert_eq!(ids, vec![0, 1, 0, 3]);
//!
//! // 3. Inferência: ids previstos → spans de slots
//! let slots = decode(&tokens, &ids, &scheme);
//! assert_eq!(slots["crop"][0].value, "wheat");
//! assert_eq!(slots["location"][0].char_range, Some((18, 24)));
//! ```

pub mod artifact;
pub mod config;
pub mod dataset;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod scheme;
pub mod token;
pub mod validator;

pub use config::{AlignConfig, DatasetConfig, DecodeConfig, OffsetMode, OffsetUnit};
pub use dataset::{Example, Tokenize};
pub use decoder::{decode, DecodedSlotSpan, DecodedSlots, SpanDecoder};
pub use encoder::{encode, encode_slot_spans, SlotSpans};
pub use error::{Result, SlotError};
pub use scheme::{Label, LabelScheme};
pub use token::{CharSpan, LabeledSequence, SlotSpan, Token};
pub use validator::{validate, validate_ids};
