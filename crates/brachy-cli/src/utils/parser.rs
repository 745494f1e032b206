use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("Invalid seed specification '{0}'. Expected 'NAME[:STRENGTH]' (e.g., 'Amersham6711Seed:0.5').")]
    InvalidSeedFormat(String),

    #[error("Invalid air-kerma strength '{strength}' in seed specification '{spec}'.")]
    InvalidStrength { spec: String, strength: String },

    #[error("Component '{component}' cannot be empty in seed specification '{spec}'.")]
    EmptyComponent {
        component: &'static str,
        spec: String,
    },
}

/// Splits a `NAME[:STRENGTH]` seed specification. A missing strength is left to
/// the configured default.
pub fn parse_seed_spec(spec: &str) -> Result<(String, Option<f64>), ParseError> {
    let mut parts = spec.split(':');
    let name = parts.next().unwrap_or_default().trim();
    let strength = parts.next().map(str::trim);
    if parts.next().is_some() {
        return Err(ParseError::InvalidSeedFormat(spec.to_string()));
    }
    if name.is_empty() {
        return Err(ParseError::EmptyComponent {
            component: "name",
            spec: spec.to_string(),
        });
    }

    let strength = match strength {
        None => None,
        Some("") => {
            return Err(ParseError::EmptyComponent {
                component: "strength",
                spec: spec.to_string(),
            });
        }
        Some(value) => Some(value.parse::<f64>().map_err(|_| ParseError::InvalidStrength {
            spec: spec.to_string(),
            strength: value.to_string(),
        })?),
    };
    Ok((name.to_string(), strength))
}
