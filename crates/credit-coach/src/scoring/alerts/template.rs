use std::collections::BTreeMap;

/// Value substituted into a description placeholder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TemplateValue {
    Integer(i64),
    Decimal(f64),
}

impl TemplateValue {
    fn render(&self, precision: Option<usize>) -> String {
        match (self, precision) {
            (TemplateValue::Integer(value), None) => value.to_string(),
            (TemplateValue::Integer(value), Some(places)) => {
                format!("{:.*}", places, *value as f64)
            }
            (TemplateValue::Decimal(value), None) => value.to_string(),
            (TemplateValue::Decimal(value), Some(places)) => format!("{:.*}", places, value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateContext {
    values: BTreeMap<&'static str, TemplateValue>,
}

impl TemplateContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: &'static str, value: TemplateValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&TemplateValue> {
        self.values.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("template references unknown key '{0}'")]
    MissingKey(String),
    #[error("placeholder opened at byte {0} is never closed")]
    Unterminated(usize),
    #[error("unsupported format spec '{0}'")]
    InvalidSpec(String),
}

/// Substitutes `{key}` and `{key:.N}` placeholders; `{{` and `}}` produce literal braces.
pub fn render(template: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    let mut output = String::with_capacity(template.len());
    let mut chars = template.char_indices().peekable();

    while let Some((offset, ch)) = chars.next() {
        match ch {
            '{' if matches!(chars.peek(), Some((_, '{'))) => {
                chars.next();
                output.push('{');
            }
            '}' if matches!(chars.peek(), Some((_, '}'))) => {
                chars.next();
                output.push('}');
            }
            '{' => {
                let mut placeholder = String::new();
                let mut closed = false;
                for (_, inner) in chars.by_ref() {
                    if inner == '}' {
                        closed = true;
                        break;
                    }
                    placeholder.push(inner);
                }
                if !closed {
                    return Err(TemplateError::Unterminated(offset));
                }
                output.push_str(&substitute(&placeholder, context)?);
            }
            other => output.push(other),
        }
    }

    Ok(output)
}

fn substitute(placeholder: &str, context: &TemplateContext) -> Result<String, TemplateError> {
    let (key, spec) = match placeholder.split_once(':') {
        Some((key, spec)) => (key.trim(), Some(spec.trim())),
        None => (placeholder.trim(), None),
    };

    let precision = match spec {
        None => None,
        Some(spec) => Some(parse_precision(spec)?),
    };

    context
        .get(key)
        .map(|value| value.render(precision))
        .ok_or_else(|| TemplateError::MissingKey(key.to_string()))
}

fn parse_precision(spec: &str) -> Result<usize, TemplateError> {
    spec.strip_prefix('.')
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(|| TemplateError::InvalidSpec(spec.to_string()))
}
