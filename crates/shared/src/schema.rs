//! Схема параметров типа сущности

use serde::{Deserialize, Serialize};

use crate::parameters::{evaluate_expression, ParameterError};
use crate::{ParamRecord, ParamValue};

/// Ошибки проверки значения параметра по схеме
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// Параметра нет в схеме
    #[error("Unknown parameter '{0}'")]
    UnknownParam(String),
    /// Вид значения не совпадает со схемой
    #[error("Parameter '{name}' expects {expected}, got {found}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    /// Значения нет в списке вариантов
    #[error("Parameter '{name}' has no option '{value}'")]
    UnknownOption { name: String, value: String },
    /// NaN или бесконечность
    #[error("Parameter '{0}' must be a finite number")]
    NotFinite(String),
    /// Не удалось разобрать ввод
    #[error("Parameter '{name}': {source}")]
    Expression {
        name: String,
        #[source]
        source: ParameterError,
    },
    /// Не удалось разобрать логическое значение
    #[error("Parameter '{name}' expects true/false, got '{text}'")]
    InvalidBool { name: String, text: String },
}

/// Описание одного параметра: вид, значение по умолчанию, ограничения
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamSpec {
    Number {
        default: f64,
        min: f64,
        max: f64,
        step: f64,
    },
    Bool {
        default: bool,
    },
    Enum {
        default: String,
        options: Vec<String>,
    },
    Text {
        default: String,
    },
}

impl ParamSpec {
    pub fn default_value(&self) -> ParamValue {
        match self {
            ParamSpec::Number { default, .. } => ParamValue::Number(*default),
            ParamSpec::Bool { default } => ParamValue::Bool(*default),
            ParamSpec::Enum { default, .. } => ParamValue::Text(default.clone()),
            ParamSpec::Text { default } => ParamValue::Text(default.clone()),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ParamSpec::Number { .. } => "number",
            ParamSpec::Bool { .. } => "boolean",
            ParamSpec::Enum { .. } => "enum",
            ParamSpec::Text { .. } => "text",
        }
    }

    /// Привести значение к схеме. Числа ограничиваются диапазоном.
    pub fn coerce(&self, name: &str, value: &ParamValue) -> Result<ParamValue, ParamError> {
        let mismatch = || ParamError::KindMismatch {
            name: name.to_string(),
            expected: self.kind_name(),
            found: value.kind_name(),
        };

        match (self, value) {
            (ParamSpec::Number { min, max, .. }, ParamValue::Number(v)) => {
                if !v.is_finite() {
                    return Err(ParamError::NotFinite(name.to_string()));
                }
                Ok(ParamValue::Number(v.max(*min).min(*max)))
            }
            (ParamSpec::Bool { .. }, ParamValue::Bool(v)) => Ok(ParamValue::Bool(*v)),
            (ParamSpec::Enum { options, .. }, ParamValue::Text(v)) => {
                if options.iter().any(|o| o == v) {
                    Ok(ParamValue::Text(v.clone()))
                } else {
                    Err(ParamError::UnknownOption {
                        name: name.to_string(),
                        value: v.clone(),
                    })
                }
            }
            (ParamSpec::Text { .. }, ParamValue::Text(v)) => Ok(ParamValue::Text(v.clone())),
            _ => Err(mismatch()),
        }
    }

    /// Разобрать текстовый ввод инспектора.
    ///
    /// Для чисел допускается выражение со ссылками на другие параметры.
    pub fn parse_input(
        &self,
        name: &str,
        text: &str,
        params: &ParamRecord,
    ) -> Result<ParamValue, ParamError> {
        let value = match self {
            ParamSpec::Number { .. } => {
                let v = evaluate_expression(text, params).map_err(|source| {
                    ParamError::Expression {
                        name: name.to_string(),
                        source,
                    }
                })?;
                ParamValue::Number(v)
            }
            ParamSpec::Bool { .. } => match text.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" | "on" => ParamValue::Bool(true),
                "false" | "0" | "no" | "off" => ParamValue::Bool(false),
                _ => {
                    return Err(ParamError::InvalidBool {
                        name: name.to_string(),
                        text: text.to_string(),
                    })
                }
            },
            ParamSpec::Enum { .. } => ParamValue::Text(text.trim().to_string()),
            ParamSpec::Text { .. } => ParamValue::Text(text.to_string()),
        };
        self.coerce(name, &value)
    }
}

/// Именованный параметр схемы
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamDef {
    pub name: String,
    pub label: String,
    pub spec: ParamSpec,
}

/// Упорядоченная схема параметров
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ParamSchema {
    params: Vec<ParamDef>,
}

impl ParamSchema {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, name: &str, label: &str, spec: ParamSpec) -> Self {
        debug_assert!(self.get(name).is_none(), "duplicate parameter {name}");
        self.params.push(ParamDef {
            name: name.to_string(),
            label: label.to_string(),
            spec,
        });
        self
    }

    pub fn number(self, name: &str, label: &str, default: f64, min: f64, max: f64, step: f64) -> Self {
        self.with(
            name,
            label,
            ParamSpec::Number {
                default,
                min,
                max,
                step,
            },
        )
    }

    pub fn boolean(self, name: &str, label: &str, default: bool) -> Self {
        self.with(name, label, ParamSpec::Bool { default })
    }

    pub fn choice(self, name: &str, label: &str, default: &str, options: &[&str]) -> Self {
        self.with(
            name,
            label,
            ParamSpec::Enum {
                default: default.to_string(),
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
    }

    pub fn text(self, name: &str, label: &str, default: &str) -> Self {
        self.with(
            name,
            label,
            ParamSpec::Text {
                default: default.to_string(),
            },
        )
    }

    pub fn get(&self, name: &str) -> Option<&ParamDef> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParamDef> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Все параметры со значениями по умолчанию
    pub fn defaults(&self) -> ParamRecord {
        self.params
            .iter()
            .map(|p| (p.name.clone(), p.spec.default_value()))
            .collect()
    }

    /// Проверить одно значение
    pub fn validate(&self, name: &str, value: &ParamValue) -> Result<ParamValue, ParamError> {
        let def = self
            .get(name)
            .ok_or_else(|| ParamError::UnknownParam(name.to_string()))?;
        def.spec.coerce(name, value)
    }

    /// Привести запись к схеме: недостающие ключи получают значения по
    /// умолчанию, лишние удаляются, неверные значения заменяются значением
    /// по умолчанию. Возвращает запись и список найденных проблем.
    pub fn normalize(&self, record: &ParamRecord) -> (ParamRecord, Vec<ParamError>) {
        let mut issues = Vec::new();
        let mut out = ParamRecord::new();

        for def in &self.params {
            let value = match record.get(&def.name) {
                Some(value) => match def.spec.coerce(&def.name, value) {
                    Ok(v) => v,
                    Err(e) => {
                        issues.push(e);
                        def.spec.default_value()
                    }
                },
                None => def.spec.default_value(),
            };
            out.insert(def.name.clone(), value);
        }

        for name in record.keys() {
            if self.get(name).is_none() {
                issues.push(ParamError::UnknownParam(name.clone()));
            }
        }

        (out, issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> ParamSchema {
        ParamSchema::new()
            .number("floors", "Floors", 3.0, 1.0, 20.0, 1.0)
            .boolean("battlements", "Battlements", false)
            .choice("roof", "Roof", "flat", &["flat", "pyramid", "dome"])
            .text("label", "Label", "")
    }

    #[test]
    fn test_defaults_cover_every_param() {
        let d = schema().defaults();
        assert_eq!(d.len(), 4);
        assert_eq!(d["floors"], ParamValue::Number(3.0));
        assert_eq!(d["battlements"], ParamValue::Bool(false));
        assert_eq!(d["roof"], ParamValue::Text("flat".into()));
        assert_eq!(d["label"], ParamValue::Text(String::new()));
    }

    #[test]
    fn test_schema_preserves_order() {
        let names: Vec<_> = schema().iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, ["floors", "battlements", "roof", "label"]);
    }

    #[test]
    fn test_number_is_clamped() {
        let s = schema();
        assert_eq!(
            s.validate("floors", &ParamValue::Number(50.0)),
            Ok(ParamValue::Number(20.0))
        );
        assert_eq!(
            s.validate("floors", &ParamValue::Number(-1.0)),
            Ok(ParamValue::Number(1.0))
        );
    }

    #[test]
    fn test_non_finite_rejected() {
        let r = schema().validate("floors", &ParamValue::Number(f64::NAN));
        assert!(matches!(r, Err(ParamError::NotFinite(_))));
    }

    #[test]
    fn test_kind_mismatch() {
        let r = schema().validate("battlements", &ParamValue::Number(1.0));
        assert!(matches!(
            r,
            Err(ParamError::KindMismatch {
                expected: "boolean",
                found: "number",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_option() {
        let r = schema().validate("roof", &ParamValue::Text("onion".into()));
        assert!(matches!(r, Err(ParamError::UnknownOption { .. })));
    }

    #[test]
    fn test_unknown_param() {
        let r = schema().validate("height", &ParamValue::Number(1.0));
        assert_eq!(r, Err(ParamError::UnknownParam("height".into())));
    }

    #[test]
    fn test_normalize_fills_drops_and_repairs() {
        let mut record = ParamRecord::new();
        record.insert("floors".into(), ParamValue::Number(99.0));
        record.insert("roof".into(), ParamValue::Text("onion".into()));
        record.insert("color".into(), ParamValue::Text("red".into()));

        let (out, issues) = schema().normalize(&record);
        assert_eq!(out.len(), 4);
        assert_eq!(out["floors"], ParamValue::Number(20.0));
        assert_eq!(out["roof"], ParamValue::Text("flat".into()));
        assert_eq!(out["battlements"], ParamValue::Bool(false));
        assert!(!out.contains_key("color"));
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_normalize_clean_record_has_no_issues() {
        let s = schema();
        let (out, issues) = s.normalize(&s.defaults());
        assert!(issues.is_empty());
        assert_eq!(out, s.defaults());
    }

    #[test]
    fn test_parse_input_number_expression() {
        let s = schema();
        let params = s.defaults();
        let spec = &s.get("floors").unwrap().spec;
        assert_eq!(
            spec.parse_input("floors", "floors * 2", &params),
            Ok(ParamValue::Number(6.0))
        );
        assert!(matches!(
            spec.parse_input("floors", "abc(", &params),
            Err(ParamError::Expression { .. })
        ));
    }

    #[test]
    fn test_parse_input_bool_and_enum() {
        let s = schema();
        let params = s.defaults();
        let b = &s.get("battlements").unwrap().spec;
        assert_eq!(b.parse_input("battlements", "Yes", &params), Ok(ParamValue::Bool(true)));
        assert!(b.parse_input("battlements", "maybe", &params).is_err());

        let r = &s.get("roof").unwrap().spec;
        assert_eq!(
            r.parse_input("roof", " dome ", &params),
            Ok(ParamValue::Text("dome".into()))
        );
    }

    #[test]
    fn test_spec_serde_tag() {
        let v = serde_json::to_value(ParamSpec::Bool { default: true }).unwrap();
        assert_eq!(v["kind"], "bool");
    }
}
