// src/domains/linear_program/parser.rs
//
// Lector tolerante del formato textual: la gramática Pest tokeniza cada
// línea (números, relaciones, palabras) y este módulo clasifica las
// líneas, valida los conteos y arma el `Model` del núcleo.

use pest::Parser;
use pest_derive::Parser;
use thiserror::Error;

use optima_core::optimization::model::{
    Constraint, Model, OptimizationDirection, Relation, SignRestriction, Variable,
};

#[derive(Parser)]
#[grammar = "domains/linear_program/grammar.pest"]
struct ModelGrammar;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("Error de sintaxis en el modelo:\n{0}")]
    Syntax(String),

    #[error("Falta la dirección (max/min) al inicio del modelo: '{0}'")]
    MissingDirection(String),

    #[error("Dirección desconocida: '{0}'")]
    UnknownDirection(String),

    #[error("La función objetivo no tiene coeficientes")]
    EmptyObjective,

    #[error("La línea {line} no trae relación (<=, >=, =): '{text}'")]
    MissingRelation { line: usize, text: String },

    #[error("La línea {line} no trae RHS después de la relación: '{text}'")]
    MissingRhs { line: usize, text: String },

    #[error("La línea {line} tiene {found} coeficientes, se esperaban {expected}: '{text}'")]
    CoefficientCount {
        line: usize,
        expected: usize,
        found: usize,
        text: String,
    },

    #[error("Se esperaban {expected} fichas de signo (o una sola), se encontraron {found}")]
    SignTokenCount { expected: usize, found: usize },

    #[error("Ficha de signo desconocida: '{0}'")]
    UnknownSignToken(String),

    #[error("Ficha inesperada '{token}' en la línea {line}: '{text}'")]
    UnexpectedToken {
        token: String,
        line: usize,
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Relation(Relation),
    Word(String),
}

#[derive(Debug)]
struct Line {
    number: usize,
    text: String,
    tokens: Vec<Token>,
}

/// Limpieza compartida: BOM fuera, NBSP a espacio, saltos a LF.
/// Parsear el texto normalizado produce el mismo modelo que el original.
pub fn normalize_text(text: &str) -> String {
    text.replace('\u{FEFF}', "")
        .replace('\u{00A0}', " ")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

fn parse_number(raw: &str) -> f64 {
    // Coma decimal y menos tipográfico tolerados
    let cleaned = raw.replace(',', ".").replace('−', "-");
    cleaned.parse().unwrap_or(0.0)
}

fn tokenize(text: &str) -> Result<Vec<Line>, ParseError> {
    let pairs = ModelGrammar::parse(Rule::file, text).map_err(|e| {
        ParseError::Syntax(format!("{}\n--- entrada normalizada ---\n{}", e, text))
    })?;

    let mut lines = Vec::new();
    for pair in pairs {
        if pair.as_rule() != Rule::line {
            continue;
        }
        let number = pair.line_col().0;
        let text = pair.as_str().trim().to_string();
        let mut tokens = Vec::new();
        for t in pair.into_inner() {
            match t.as_rule() {
                Rule::number => tokens.push(Token::Number(parse_number(t.as_str()))),
                Rule::relation => {
                    let rel = match t.as_str() {
                        "<=" | "≤" => Relation::LessOrEqual,
                        ">=" | "≥" => Relation::GreaterOrEqual,
                        _ => Relation::Equal,
                    };
                    tokens.push(Token::Relation(rel));
                }
                Rule::word => tokens.push(Token::Word(t.as_str().to_string())),
                _ => {}
            }
        }
        if !tokens.is_empty() {
            lines.push(Line {
                number,
                text,
                tokens,
            });
        }
    }
    Ok(lines)
}

fn parse_direction(word: &str) -> Option<OptimizationDirection> {
    match word.to_lowercase().as_str() {
        "max" | "maximize" | "maximizar" => Some(OptimizationDirection::Maximize),
        "min" | "minimize" | "minimizar" => Some(OptimizationDirection::Minimize),
        _ => None,
    }
}

fn parse_sign_token(token: &str) -> Option<SignRestriction> {
    match token.to_lowercase().as_str() {
        "+" | "pos" | "nonneg" | "positiva" | "positivo" => Some(SignRestriction::NonNegative),
        "-" | "−" | "neg" | "nonpos" | "negativa" | "negativo" => Some(SignRestriction::NonPositive),
        "urs" | "free" | "libre" | "irrestricta" | "irrestricto" => Some(SignRestriction::Free),
        "int" | "integer" | "entera" | "entero" => Some(SignRestriction::Integer),
        "bin" | "binary" | "binaria" | "binario" | "bool" => Some(SignRestriction::Binary),
        _ => None,
    }
}

pub fn parse_model(text: &str) -> Result<Model, ParseError> {
    let normalized = normalize_text(text);
    let lines = tokenize(&normalized)?;

    if lines.is_empty() {
        return Err(ParseError::MissingDirection(String::new()));
    }

    // Línea 1: dirección + coeficientes del objetivo
    let header = &lines[0];
    let mut header_tokens = header.tokens.iter();
    let direction = match header_tokens.next() {
        Some(Token::Word(w)) => {
            parse_direction(w).ok_or_else(|| ParseError::UnknownDirection(w.clone()))?
        }
        _ => return Err(ParseError::MissingDirection(header.text.clone())),
    };

    let mut objective = Vec::new();
    for token in header_tokens {
        match token {
            Token::Number(v) => objective.push(*v),
            Token::Word(w) => {
                return Err(ParseError::UnexpectedToken {
                    token: w.clone(),
                    line: header.number,
                    text: header.text.clone(),
                });
            }
            Token::Relation(r) => {
                return Err(ParseError::UnexpectedToken {
                    token: r.to_string(),
                    line: header.number,
                    text: header.text.clone(),
                });
            }
        }
    }
    if objective.is_empty() {
        return Err(ParseError::EmptyObjective);
    }
    let n = objective.len();

    let mut model = Model::new("modelo", direction);
    for (i, coeff) in objective.iter().enumerate() {
        model.add_variable(Variable::new(&format!("x{}", i + 1), *coeff));
    }

    // Líneas intermedias: restricciones; última sin relación: signos
    let mut sign_tokens: Option<&Line> = None;

    for (idx, line) in lines.iter().enumerate().skip(1) {
        let has_relation = line
            .tokens
            .iter()
            .any(|t| matches!(t, Token::Relation(_)));

        if !has_relation {
            let is_last = idx == lines.len() - 1;
            let only_words = line.tokens.iter().all(|t| matches!(t, Token::Word(_)));
            if is_last && only_words {
                sign_tokens = Some(line);
                continue;
            }
            return Err(ParseError::MissingRelation {
                line: line.number,
                text: line.text.clone(),
            });
        }

        model.add_constraint(parse_constraint(line, n)?);
    }

    // Restricciones de signo: una por variable o una sola difundida;
    // sin línea de signos todas quedan no negativas.
    if let Some(line) = sign_tokens {
        let mut restrictions = Vec::new();
        for token in &line.tokens {
            if let Token::Word(w) = token {
                let r = parse_sign_token(w).ok_or_else(|| ParseError::UnknownSignToken(w.clone()))?;
                restrictions.push(r);
            }
        }

        if restrictions.len() == 1 {
            for v in model.variables.iter_mut() {
                v.restriction = restrictions[0];
            }
        } else if restrictions.len() == n {
            for (v, r) in model.variables.iter_mut().zip(restrictions.iter()) {
                v.restriction = *r;
            }
        } else {
            return Err(ParseError::SignTokenCount {
                expected: n,
                found: restrictions.len(),
            });
        }
    }

    Ok(model)
}

fn parse_constraint(line: &Line, n: usize) -> Result<Constraint, ParseError> {
    let mut coeffs = Vec::new();
    let mut relation = None;
    let mut rhs = None;

    for token in &line.tokens {
        match token {
            Token::Number(v) => {
                if relation.is_none() {
                    coeffs.push(*v);
                } else if rhs.is_none() {
                    rhs = Some(*v);
                } else {
                    return Err(ParseError::UnexpectedToken {
                        token: v.to_string(),
                        line: line.number,
                        text: line.text.clone(),
                    });
                }
            }
            Token::Relation(r) => {
                if relation.is_some() {
                    return Err(ParseError::UnexpectedToken {
                        token: r.to_string(),
                        line: line.number,
                        text: line.text.clone(),
                    });
                }
                relation = Some(*r);
            }
            Token::Word(w) => {
                return Err(ParseError::UnexpectedToken {
                    token: w.clone(),
                    line: line.number,
                    text: line.text.clone(),
                });
            }
        }
    }

    let relation = relation.ok_or_else(|| ParseError::MissingRelation {
        line: line.number,
        text: line.text.clone(),
    })?;
    let rhs = rhs.ok_or_else(|| ParseError::MissingRhs {
        line: line.number,
        text: line.text.clone(),
    })?;

    if coeffs.len() != n {
        return Err(ParseError::CoefficientCount {
            line: line.number,
            expected: n,
            found: coeffs.len(),
            text: line.text.clone(),
        });
    }

    Ok(Constraint::new(coeffs, relation, rhs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_max_model() {
        let model = parse_model("max 3 5\n1 0 <= 4\n0 2 <= 12\n3 2 <= 18\n+ +").expect("Parsea");

        assert_eq!(model.direction, OptimizationDirection::Maximize);
        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.constraints.len(), 3);
        assert_eq!(model.constraints[2].coeffs, vec![3.0, 2.0]);
        assert_eq!(model.constraints[2].rhs, 18.0);
        assert_eq!(model.variables[0].restriction, SignRestriction::NonNegative);
    }

    #[test]
    fn test_glued_relation_and_decimal_comma() {
        let model = parse_model("min 6 8\n3 1 >=4\n1 2 ≥ 3,5\n+ +").expect("Parsea");

        assert_eq!(model.direction, OptimizationDirection::Minimize);
        assert_eq!(model.constraints[0].rhs, 4.0);
        assert_eq!(model.constraints[0].relation, Relation::GreaterOrEqual);
        assert_eq!(model.constraints[1].rhs, 3.5);
    }

    #[test]
    fn test_comments_blank_lines_and_bom() {
        let text = "\u{FEFF}# modelo de prueba\nmax 1 1\n\n// capacidad\n1 1 <= 10  # fila única\n\n+ +\n";
        let model = parse_model(text).expect("Parsea");

        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.constraints.len(), 1);
        assert_eq!(model.constraints[0].rhs, 10.0);
    }

    #[test]
    fn test_sign_token_broadcast() {
        let model = parse_model("max 8 11 6 4\n5 7 4 3 <= 14\nbin").expect("Parsea");

        assert!(model
            .variables
            .iter()
            .all(|v| v.restriction == SignRestriction::Binary));
    }

    #[test]
    fn test_sign_tokens_per_variable() {
        let model = parse_model("max 1 2 3\n1 1 1 <= 5\n+ urs int").expect("Parsea");

        assert_eq!(model.variables[0].restriction, SignRestriction::NonNegative);
        assert_eq!(model.variables[1].restriction, SignRestriction::Free);
        assert_eq!(model.variables[2].restriction, SignRestriction::Integer);
    }

    #[test]
    fn test_missing_sign_line_defaults_to_nonnegative() {
        let model = parse_model("max 2 3\n1 1 <= 4").expect("Parsea");

        assert!(model
            .variables
            .iter()
            .all(|v| v.restriction == SignRestriction::NonNegative));
    }

    #[test]
    fn test_unknown_direction() {
        match parse_model("optimize 1 2\n1 1 <= 3\n+ +") {
            Err(ParseError::UnknownDirection(w)) => assert_eq!(w, "optimize"),
            other => panic!("Esperaba dirección desconocida, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_missing_direction() {
        match parse_model("3 5\n1 1 <= 3\n+ +") {
            Err(ParseError::MissingDirection(_)) => {}
            other => panic!("Esperaba falta de dirección, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_empty_objective() {
        match parse_model("max\n1 1 <= 3\n+ +") {
            Err(ParseError::EmptyObjective) => {}
            other => panic!("Esperaba objetivo vacío, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_constraint_count_mismatch() {
        match parse_model("max 1 2\n1 <= 3\n+ +") {
            Err(ParseError::CoefficientCount {
                expected, found, ..
            }) => {
                assert_eq!(expected, 2);
                assert_eq!(found, 1);
            }
            other => panic!("Esperaba conteo de coeficientes, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_missing_rhs() {
        match parse_model("max 1 2\n1 1 <=\n+ +") {
            Err(ParseError::MissingRhs { .. }) => {}
            other => panic!("Esperaba RHS faltante, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_middle_line_without_relation() {
        match parse_model("max 1 2\n1 1\n1 0 <= 3\n+ +") {
            Err(ParseError::MissingRelation { line, .. }) => assert_eq!(line, 2),
            other => panic!("Esperaba relación faltante, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_unknown_sign_token() {
        match parse_model("max 1 2\n1 1 <= 3\n+ quizas") {
            Err(ParseError::UnknownSignToken(w)) => assert_eq!(w, "quizas"),
            other => panic!("Esperaba ficha desconocida, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_sign_token_count_mismatch() {
        match parse_model("max 1 2 3\n1 1 1 <= 3\n+ +") {
            Err(ParseError::SignTokenCount { expected, found }) => {
                assert_eq!(expected, 3);
                assert_eq!(found, 2);
            }
            other => panic!("Esperaba conteo de signos, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_normalized_parse_is_idempotent() {
        let raw = "\u{FEFF}max 3\u{00A0}5\r\n1 0 <= 4\r\n0 2 <= 12\r\n+ +";
        let direct = parse_model(raw).expect("Parsea el crudo");
        let normalized = parse_model(&normalize_text(raw)).expect("Parsea el normalizado");

        assert_eq!(direct.direction, normalized.direction);
        assert_eq!(
            direct.objective_coeffs(),
            normalized.objective_coeffs()
        );
        assert_eq!(direct.constraints, normalized.constraints);
    }

    #[test]
    fn test_negative_and_typographic_minus_coefficients() {
        let model = parse_model("max -1 2\n-1 −2 <= -4\n+ +").expect("Parsea");

        assert_eq!(model.variables[0].objective_coeff, -1.0);
        assert_eq!(model.constraints[0].coeffs, vec![-1.0, -2.0]);
        assert_eq!(model.constraints[0].rhs, -4.0);
    }
}
