//! Текстовый формат файла проекта: JSON-массив записей сущностей

use crate::EntityRecord;

/// Сериализовать список сущностей
pub fn serialize_entities(records: &[EntityRecord]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(records)
}

/// Разобрать список сущностей
pub fn parse_entities(text: &str) -> serde_json::Result<Vec<EntityRecord>> {
    serde_json::from_str(text)
}
