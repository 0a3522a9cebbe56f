use crate::{ParamRecord, ParamValue};
use evalexpr::{build_operator_tree, ContextWithMutableVariables, HashMapContext, Value};
use std::collections::HashSet;

/// Результат вычисления числового выражения
pub type ParameterResult = Result<f64, ParameterError>;

/// Ошибки при вычислении выражений параметров
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    /// Ошибка парсинга формулы
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Ошибка вычисления формулы
    #[error("Evaluation error: {0}")]
    EvaluationError(String),
    /// Неверный тип значения
    #[error("Invalid type: {0}")]
    InvalidType(String),
}

/// Вычислить числовое выражение, введённое в инспекторе.
///
/// В выражении можно ссылаться на другие числовые параметры сущности
/// (`width * 2`), а также на константы `PI` и `E`.
pub fn evaluate_expression(expression: &str, params: &ParamRecord) -> ParameterResult {
    let mut context = HashMapContext::new();

    // Добавить только используемые параметры
    for name in expression_dependencies(expression, params) {
        if let Some(value) = params.get(&name).and_then(ParamValue::as_number) {
            context
                .set_value(name, Value::Float(value))
                .map_err(|e| ParameterError::EvaluationError(e.to_string()))?;
        }
    }

    // Математические константы
    context
        .set_value("PI".to_string(), Value::Float(std::f64::consts::PI))
        .ok();
    context
        .set_value("E".to_string(), Value::Float(std::f64::consts::E))
        .ok();

    let tree = build_operator_tree(expression.trim())
        .map_err(|e| ParameterError::ParseError(e.to_string()))?;

    let value = tree
        .eval_with_context(&context)
        .map_err(|e| ParameterError::EvaluationError(e.to_string()))?;

    let number = match value {
        Value::Float(f) => f,
        Value::Int(i) => i as f64,
        _ => {
            return Err(ParameterError::InvalidType(format!(
                "Expected number, got {:?}",
                value
            )))
        }
    };

    if number.is_finite() {
        Ok(number)
    } else {
        Err(ParameterError::EvaluationError(format!(
            "Result is not finite: {}",
            number
        )))
    }
}

/// Числовые параметры, на которые ссылается выражение
pub fn expression_dependencies(expression: &str, params: &ParamRecord) -> HashSet<String> {
    // Простой способ: имя параметра должно встречаться в выражении как слово
    let words: HashSet<&str> = expression
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|w| !w.is_empty())
        .collect();

    params
        .iter()
        .filter(|(name, value)| words.contains(name.as_str()) && value.as_number().is_some())
        .map(|(name, _)| name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ParamRecord {
        let mut params = ParamRecord::new();
        params.insert("width".to_string(), ParamValue::Number(10.0));
        params.insert("floor_height".to_string(), ParamValue::Number(3.0));
        params.insert("roof".to_string(), ParamValue::Text("dome".to_string()));
        params
    }

    #[test]
    fn test_evaluate_plain_number() {
        assert_eq!(evaluate_expression("4.5", &record()), Ok(4.5));
        assert_eq!(evaluate_expression(" 7 ", &record()), Ok(7.0));
    }

    #[test]
    fn test_evaluate_formula_with_params() {
        assert_eq!(evaluate_expression("width * 2", &record()), Ok(20.0));
        assert_eq!(evaluate_expression("floor_height + 1", &record()), Ok(4.0));
    }

    #[test]
    fn test_complex_formula() {
        let value = evaluate_expression("PI * width^2", &record()).unwrap();
        let expected = std::f64::consts::PI * 100.0;
        assert!((value - expected).abs() < 0.0001);
    }

    #[test]
    fn test_parse_error() {
        let result = evaluate_expression("width * (", &record());
        assert!(matches!(result, Err(ParameterError::ParseError(_))));
    }

    #[test]
    fn test_unknown_identifier_is_evaluation_error() {
        let result = evaluate_expression("depth * 2", &record());
        assert!(matches!(result, Err(ParameterError::EvaluationError(_))));
    }

    #[test]
    fn test_non_numeric_result() {
        let result = evaluate_expression("true", &record());
        assert!(matches!(result, Err(ParameterError::InvalidType(_))));
    }

    #[test]
    fn test_dependencies_match_whole_words() {
        let deps = expression_dependencies("width + floor_height", &record());
        assert!(deps.contains("width"));
        assert!(deps.contains("floor_height"));
        assert_eq!(deps.len(), 2);

        // "roof" is text, never a numeric dependency
        let deps = expression_dependencies("roof + 1", &record());
        assert!(deps.is_empty());

        // substring of another identifier does not count
        let deps = expression_dependencies("widths", &record());
        assert!(deps.is_empty());
    }
}
