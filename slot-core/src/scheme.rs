//! # Esquema de Rótulos BIO
//!
//! Define o vocabulário **BIO** (Beginning-Inside-Outside) para um conjunto
//! fixo de slots e o mapeamento bidirecional rótulo ↔ id compartilhado pelo
//! treino e pela inferência.
//!
//! ## Ordem canônica
//!
//! | id | rótulo       |
//! |----|--------------|
//! | 0  | `O`          |
//! | 1  | `B-crop`     |
//! | 2  | `I-crop`     |
//! | 3  | `B-location` |
//! | 4  | `I-location` |
//!
//! `O` vem sempre primeiro; depois, para cada slot em ordem lexicográfica, o
//! par `B-<slot>`, `I-<slot>`. Essa ordem é o contrato de saída do modelo:
//! adicionar, remover ou reordenar um slot invalida modelos já treinados, por
//! isso o esquema é salvo junto a cada checkpoint (ver [`crate::artifact`]).

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SlotError};

const OUTSIDE: &str = "O";
const BEGIN_PREFIX: &str = "B-";
const INSIDE_PREFIX: &str = "I-";

/// Visão tipada de um rótulo BIO.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Label {
    /// **Begin**: primeiro token de uma ocorrência. Ex: **wheat** (B-crop) field.
    Begin(String),
    /// **Inside**: continuação da ocorrência. Ex: wheat **field** (I-crop).
    Inside(String),
    /// **Outside**: o token não pertence a nenhum slot.
    Outside,
}

impl Label {
    /// Representação textual (ex: "B-crop", "I-location", "O").
    pub fn label(&self) -> String {
        match self {
            Label::Begin(slot) => format!("{BEGIN_PREFIX}{slot}"),
            Label::Inside(slot) => format!("{INSIDE_PREFIX}{slot}"),
            Label::Outside => OUTSIDE.to_string(),
        }
    }

    pub fn slot(&self) -> Option<&str> {
        match self {
            Label::Begin(slot) | Label::Inside(slot) => Some(slot),
            Label::Outside => None,
        }
    }

    /// Parseia um rótulo (ex: "B-crop" → `Begin("crop")`).
    ///
    /// Só o primeiro hífen separa o prefixo, então nomes de slot com hífen
    /// ("B-sowing-date") são aceitos.
    pub fn from_label(s: &str) -> Option<Self> {
        if s == OUTSIDE {
            return Some(Label::Outside);
        }
        if let Some(slot) = s.strip_prefix(BEGIN_PREFIX) {
            return (!slot.is_empty()).then(|| Label::Begin(slot.to_string()));
        }
        if let Some(slot) = s.strip_prefix(INSIDE_PREFIX) {
            return (!slot.is_empty()).then(|| Label::Inside(slot.to_string()));
        }
        None
    }

    /// Verifica se `prev → next` é uma transição válida no esquema BIO.
    ///
    /// `prev = None` representa o início da sequência.
    ///
    /// Regras:
    /// - `I-X` só pode seguir `B-X` ou `I-X` (mesmo slot)
    /// - `B-X` e `O` podem seguir qualquer rótulo
    pub fn is_valid_transition(prev: Option<&Label>, next: &Label) -> bool {
        match next {
            Label::Inside(slot) => match prev {
                Some(Label::Begin(prev_slot)) | Some(Label::Inside(prev_slot)) => prev_slot == slot,
                _ => false,
            },
            _ => true,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Vocabulário BIO imutável para um conjunto de slots.
///
/// Construído uma vez por versão do esquema e compartilhado por referência
/// entre codificação e decodificação. É um valor puro: `Send + Sync`, sem
/// mutação interior, seguro para leitura concorrente.
///
/// Serializa como a lista ordenada de rótulos, e a desserialização rejeita
/// qualquer lista que [`LabelScheme::build`] não produziria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelScheme {
    /// Nomes de slot em ordem lexicográfica.
    slots: Vec<String>,
    /// Rótulos em ordem de id.
    labels: Vec<String>,
    /// Índice reverso rótulo → id.
    ids: HashMap<String, usize>,
}

impl LabelScheme {
    /// Constrói o esquema a partir dos nomes de slot.
    ///
    /// A ordem de entrada é irrelevante: os slots são ordenados antes de
    /// gerar os rótulos. Falha com [`SlotError::Schema`] se houver nome vazio
    /// ou repetido.
    pub fn build<I, S>(slot_names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut slots = Vec::new();
        let mut seen = HashSet::new();
        for name in slot_names {
            let name: String = name.into();
            if name.is_empty() {
                return Err(SlotError::Schema("nome de slot vazio".to_string()));
            }
            if !seen.insert(name.clone()) {
                return Err(SlotError::Schema(format!("slot duplicado: '{name}'")));
            }
            slots.push(name);
        }
        slots.sort();

        let mut labels = Vec::with_capacity(1 + 2 * slots.len());
        labels.push(OUTSIDE.to_string());
        for slot in &slots {
            labels.push(Label::Begin(slot.clone()).label());
            labels.push(Label::Inside(slot.clone()).label());
        }

        let ids = labels
            .iter()
            .enumerate()
            .map(|(id, label)| (label.clone(), id))
            .collect();

        Ok(Self { slots, labels, ids })
    }

    /// Reconstrói o esquema a partir da lista de rótulos persistida.
    ///
    /// A lista precisa estar exatamente na ordem canônica; não há remapeamento.
    pub fn from_labels(labels: Vec<String>) -> Result<Self> {
        match labels.first() {
            Some(first) if first == OUTSIDE => {}
            _ => {
                return Err(SlotError::Schema(
                    "a lista de rótulos deve começar com 'O'".to_string(),
                ))
            }
        }
        if labels.len() % 2 == 0 {
            return Err(SlotError::Schema(format!(
                "lista com {} rótulos não forma pares B-/I-",
                labels.len()
            )));
        }

        let mut slots = Vec::with_capacity(labels.len() / 2);
        for pair in labels[1..].chunks(2) {
            match (Label::from_label(&pair[0]), Label::from_label(&pair[1])) {
                (Some(Label::Begin(b)), Some(Label::Inside(i))) if b == i => slots.push(b),
                _ => {
                    return Err(SlotError::Schema(format!(
                        "par de rótulos inesperado: '{}', '{}'",
                        pair[0], pair[1]
                    )))
                }
            }
        }

        let scheme = Self::build(slots)?;
        if scheme.labels != labels {
            return Err(SlotError::Schema(
                "rótulos fora da ordem canônica".to_string(),
            ));
        }
        Ok(scheme)
    }

    /// Reconstrói o esquema a partir de um mapa rótulo → id (ex: `slot_to_id`).
    ///
    /// Os ids precisam ser contíguos a partir de 0 e seguir a ordem canônica.
    pub fn from_label_map(map: &HashMap<String, usize>) -> Result<Self> {
        let mut ordered: Vec<Option<String>> = vec![None; map.len()];
        for (label, &id) in map {
            let Some(entry) = ordered.get_mut(id) else {
                return Err(SlotError::Schema(format!(
                    "id {id} de '{label}' fora do intervalo 0..{}",
                    map.len()
                )));
            };
            if let Some(other) = entry {
                return Err(SlotError::Schema(format!(
                    "id {id} atribuído a '{other}' e '{label}'"
                )));
            }
            *entry = Some(label.clone());
        }
        let labels = ordered.into_iter().flatten().collect();
        Self::from_labels(labels)
    }

    /// Id de um rótulo textual.
    pub fn id_of(&self, label: &str) -> Option<usize> {
        self.ids.get(label).copied()
    }

    /// Rótulo textual de um id.
    pub fn label_of(&self, id: usize) -> Option<&str> {
        self.labels.get(id).map(String::as_str)
    }

    /// Visão tipada do rótulo de um id.
    pub fn label(&self, id: usize) -> Option<Label> {
        self.label_of(id).and_then(Label::from_label)
    }

    /// Id de `O`; sempre 0.
    pub fn o_id(&self) -> usize {
        0
    }

    pub fn is_begin(&self, id: usize) -> bool {
        id > 0 && id < self.labels.len() && id % 2 == 1
    }

    pub fn is_inside(&self, id: usize) -> bool {
        id > 0 && id < self.labels.len() && id % 2 == 0
    }

    /// Nome do slot de um id `B-`/`I-`; `None` para `O` ou ids desconhecidos.
    pub fn slot_of(&self, id: usize) -> Option<&str> {
        if id == 0 {
            return None;
        }
        self.slots.get((id - 1) / 2).map(String::as_str)
    }

    pub fn begin_id(&self, slot: &str) -> Option<usize> {
        self.slot_index(slot).map(|k| 1 + 2 * k)
    }

    pub fn inside_id(&self, slot: &str) -> Option<usize> {
        self.slot_index(slot).map(|k| 2 + 2 * k)
    }

    /// Slots em ordem lexicográfica, a mesma ordem usada pelo codificador.
    pub fn slots(&self) -> &[String] {
        &self.slots
    }

    /// Rótulos em ordem de id.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Número total de rótulos (`1 + 2 * slots`).
    pub fn num_labels(&self) -> usize {
        self.labels.len()
    }

    fn slot_index(&self, slot: &str) -> Option<usize> {
        self.slots
            .binary_search_by(|probe| probe.as_str().cmp(slot))
            .ok()
    }
}

impl TryFrom<Vec<String>> for LabelScheme {
    type Error = SlotError;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::from_labels(labels)
    }
}

impl From<LabelScheme> for Vec<String> {
    fn from(scheme: LabelScheme) -> Self {
        scheme.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crop_location() -> LabelScheme {
        LabelScheme::build(["location", "crop"]).unwrap()
    }

    #[test]
    fn test_labels_in_canonical_order() {
        let scheme = crop_location();
        assert_eq!(
            scheme.labels(),
            &["O", "B-crop", "I-crop", "B-location", "I-location"]
        );
        assert_eq!(scheme.slots(), &["crop", "location"]);
    }

    #[test]
    fn test_build_is_independent_of_input_order() {
        let a = LabelScheme::build(["stage", "crop", "location"]).unwrap();
        let b = LabelScheme::build(["location", "stage", "crop"]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_build_rejects_duplicates_and_empty() {
        assert!(matches!(
            LabelScheme::build(["crop", "crop"]),
            Err(SlotError::Schema(_))
        ));
        assert!(matches!(
            LabelScheme::build(["crop", ""]),
            Err(SlotError::Schema(_))
        ));
    }

    #[test]
    fn test_id_queries() {
        let scheme = crop_location();
        assert_eq!(scheme.o_id(), 0);
        assert_eq!(scheme.id_of("O"), Some(0));
        assert_eq!(scheme.id_of("I-location"), Some(4));
        assert_eq!(scheme.id_of("B-date"), None);
        assert_eq!(scheme.label_of(3), Some("B-location"));
        assert_eq!(scheme.label_of(5), None);

        assert!(scheme.is_begin(1));
        assert!(!scheme.is_begin(2));
        assert!(scheme.is_inside(2));
        assert!(!scheme.is_inside(0));
        assert!(!scheme.is_begin(5));

        assert_eq!(scheme.slot_of(0), None);
        assert_eq!(scheme.slot_of(2), Some("crop"));
        assert_eq!(scheme.slot_of(3), Some("location"));
        assert_eq!(scheme.slot_of(9), None);

        assert_eq!(scheme.begin_id("location"), Some(3));
        assert_eq!(scheme.inside_id("crop"), Some(2));
        assert_eq!(scheme.begin_id("date"), None);
    }

    #[test]
    fn test_empty_scheme_has_only_outside() {
        let scheme = LabelScheme::build(Vec::<String>::new()).unwrap();
        assert_eq!(scheme.labels(), &["O"]);
        assert_eq!(scheme.num_labels(), 1);
    }

    #[test]
    fn test_label_parsing() {
        assert_eq!(Label::from_label("O"), Some(Label::Outside));
        assert_eq!(
            Label::from_label("B-crop"),
            Some(Label::Begin("crop".to_string()))
        );
        assert_eq!(
            Label::from_label("I-sowing-date"),
            Some(Label::Inside("sowing-date".to_string()))
        );
        assert_eq!(Label::from_label("B-"), None);
        assert_eq!(Label::from_label("X-crop"), None);
        assert_eq!(Label::Inside("crop".to_string()).to_string(), "I-crop");
    }

    #[test]
    fn test_valid_transitions() {
        let b_crop = Label::Begin("crop".to_string());
        let i_crop = Label::Inside("crop".to_string());
        let i_loc = Label::Inside("location".to_string());
        assert!(Label::is_valid_transition(Some(&b_crop), &i_crop));
        assert!(Label::is_valid_transition(Some(&i_crop), &i_crop));
        assert!(!Label::is_valid_transition(Some(&Label::Outside), &i_crop));
        assert!(!Label::is_valid_transition(Some(&b_crop), &i_loc));
        assert!(!Label::is_valid_transition(None, &i_crop));
        assert!(Label::is_valid_transition(None, &b_crop));
    }

    #[test]
    fn test_from_labels_round_trip() {
        let scheme = crop_location();
        let rebuilt = LabelScheme::from_labels(scheme.labels().to_vec()).unwrap();
        assert_eq!(scheme, rebuilt);
    }

    #[test]
    fn test_from_labels_rejects_non_canonical_lists() {
        let reordered = vec!["O", "B-location", "I-location", "B-crop", "I-crop"];
        let err = LabelScheme::from_labels(reordered.into_iter().map(String::from).collect());
        assert!(matches!(err, Err(SlotError::Schema(_))));

        let no_outside = vec!["B-crop", "I-crop"];
        assert!(LabelScheme::from_labels(no_outside.into_iter().map(String::from).collect()).is_err());

        let broken_pair = vec!["O", "B-crop", "I-location"];
        assert!(LabelScheme::from_labels(broken_pair.into_iter().map(String::from).collect()).is_err());
    }

    #[test]
    fn test_from_label_map() {
        let map: HashMap<String, usize> = [("O", 0), ("B-crop", 1), ("I-crop", 2)]
            .into_iter()
            .map(|(l, i)| (l.to_string(), i))
            .collect();
        let scheme = LabelScheme::from_label_map(&map).unwrap();
        assert_eq!(scheme.labels(), &["O", "B-crop", "I-crop"]);

        let gap: HashMap<String, usize> = [("O", 0), ("B-crop", 1), ("I-crop", 3)]
            .into_iter()
            .map(|(l, i)| (l.to_string(), i))
            .collect();
        assert!(LabelScheme::from_label_map(&gap).is_err());
    }

    #[test]
    fn test_serializes_as_label_list() {
        let scheme = crop_location();
        let json = serde_json::to_string(&scheme).unwrap();
        assert_eq!(json, r#"["O","B-crop","I-crop","B-location","I-location"]"#);

        let back: LabelScheme = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scheme);

        let bad: std::result::Result<LabelScheme, _> = serde_json::from_str(r#"["B-crop"]"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_scheme_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LabelScheme>();
    }
}
