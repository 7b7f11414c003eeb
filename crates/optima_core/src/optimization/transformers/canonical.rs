// src/optimization/transformers/canonical.rs
//
// Transforma un modelo de usuario en la forma estándar lista para el
// tableau: el motor SIEMPRE maximiza, b >= 0, y la base inicial es una
// submatriz identidad formada por holguras y artificiales.

use crate::linear_algebra::DenseMatrix;
use crate::optimization::error::LinearOptimizationError;
use crate::optimization::model::{Model, OptimizationDirection, Relation, SignRestriction};

/// Columnas canónicas asociadas a una variable original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableColumns {
    /// Una sola columna; `negated` indica la sustitución x = -y
    Single { col: usize, negated: bool },
    /// Variable libre partida en x⁺ y x⁻
    Split { pos: usize, neg: usize },
}

/// Mapa de nombres para descifrar la respuesta y armar los reportes.
#[derive(Debug, Clone)]
pub struct NameMap {
    /// Nombre por columna canónica (x.., s.., r.., a..)
    pub column_names: Vec<String>,
    /// Nombre por fila (c1..)
    pub row_names: Vec<String>,
    /// Expansión de cada variable original a columnas canónicas
    pub variable_columns: Vec<VariableColumns>,
    /// Columnas auxiliares agregadas en cada fila
    pub row_added_columns: Vec<Vec<usize>>,
}

/// Forma estándar: A x = b con x >= 0, lista para armar el tableau.
#[derive(Debug, Clone)]
pub struct CanonicalForm {
    pub a: DenseMatrix<f64>,
    pub b: Vec<f64>,
    /// Objetivo de Fase II sobre todas las columnas (convención max)
    pub c: Vec<f64>,
    /// Constante del objetivo
    pub z0: f64,

    pub basic_idx: Vec<usize>,
    pub non_basic_idx: Vec<usize>,

    pub needs_phase_one: bool,
    /// Objetivo auxiliar: maximizar -Σ artificiales (0 en el resto)
    pub c_phase_one: Vec<f64>,

    pub slack_cols: Vec<usize>,
    pub surplus_cols: Vec<usize>,
    pub artificial_cols: Vec<usize>,

    pub num_decision_cols: usize,

    /// El modelo original era MIN: el objetivo reportado se niega al final
    pub flip_objective: bool,

    pub names: NameMap,
}

impl CanonicalForm {
    pub fn num_rows(&self) -> usize {
        self.a.rows
    }

    pub fn num_cols(&self) -> usize {
        self.a.cols
    }

    /// Columna canónica de una variable original de una sola columna.
    pub fn decision_column(&self, var: usize) -> Option<usize> {
        match self.names.variable_columns.get(var)? {
            VariableColumns::Single { col, .. } => Some(*col),
            VariableColumns::Split { .. } => None,
        }
    }

    /// Traduce valores por columna canónica a valores de las variables
    /// originales (deshace la negación y la partición x⁺/x⁻).
    pub fn recover_solution(&self, col_values: &[f64]) -> Vec<f64> {
        self.names
            .variable_columns
            .iter()
            .map(|vc| match vc {
                VariableColumns::Single { col, negated } => {
                    let v = col_values.get(*col).copied().unwrap_or(0.0);
                    if *negated { -v } else { v }
                }
                VariableColumns::Split { pos, neg } => {
                    let p = col_values.get(*pos).copied().unwrap_or(0.0);
                    let n = col_values.get(*neg).copied().unwrap_or(0.0);
                    p - n
                }
            })
            .collect()
    }
}

/// Expansión de variables: cada variable original produce una o dos
/// columnas no negativas, con el signo del coeficiente ajustado.
fn expand_variables(
    model: &Model,
    sign: f64,
) -> (Vec<VariableColumns>, Vec<String>, Vec<f64>) {
    let mut variable_columns = Vec::with_capacity(model.variables.len());
    let mut column_names = Vec::new();
    let mut obj = Vec::new();

    for v in &model.variables {
        match v.restriction {
            SignRestriction::NonNegative | SignRestriction::Integer | SignRestriction::Binary => {
                variable_columns.push(VariableColumns::Single {
                    col: column_names.len(),
                    negated: false,
                });
                column_names.push(v.name.clone());
                obj.push(sign * v.objective_coeff);
            }
            SignRestriction::NonPositive => {
                // x = -y con y >= 0: el coeficiente cambia de signo en todas partes
                variable_columns.push(VariableColumns::Single {
                    col: column_names.len(),
                    negated: true,
                });
                column_names.push(v.name.clone());
                obj.push(sign * -v.objective_coeff);
            }
            SignRestriction::Free => {
                let pos = column_names.len();
                column_names.push(format!("{}+", v.name));
                column_names.push(format!("{}-", v.name));
                obj.push(sign * v.objective_coeff);
                obj.push(sign * -v.objective_coeff);
                variable_columns.push(VariableColumns::Split { pos, neg: pos + 1 });
            }
        }
    }

    (variable_columns, column_names, obj)
}

/// Remapea los coeficientes de una restricción según la expansión.
fn expand_row(
    coeffs: &[f64],
    variable_columns: &[VariableColumns],
    num_decision_cols: usize,
) -> Vec<f64> {
    let mut row = vec![0.0; num_decision_cols];
    for (orig, a) in coeffs.iter().enumerate() {
        match &variable_columns[orig] {
            VariableColumns::Single { col, negated } => {
                row[*col] += if *negated { -a } else { *a };
            }
            VariableColumns::Split { pos, neg } => {
                row[*pos] += *a;
                row[*neg] += -*a;
            }
        }
    }
    row
}

pub fn to_canonical_form(model: &Model) -> Result<CanonicalForm, LinearOptimizationError> {
    model.validate()?;

    // 1. Si el modelo es MIN multiplicamos c por -1: el motor siempre maximiza
    let flip = model.direction == OptimizationDirection::Minimize;
    let sign = if flip { -1.0 } else { 1.0 };

    // 2. Expansión de variables a columnas no negativas
    let (variable_columns, mut column_names, obj) = expand_variables(model, sign);
    let num_decision_cols = column_names.len();

    // 3-4. Remapeo de coeficientes y normalización b >= 0
    struct RowBuild {
        coeffs: Vec<f64>,
        relation: Relation,
        rhs: f64,
    }

    let mut rows = Vec::with_capacity(model.constraints.len());
    for c in &model.constraints {
        let mut coeffs = expand_row(&c.coeffs, &variable_columns, num_decision_cols);
        let mut relation = c.relation;
        let mut rhs = c.rhs;
        if rhs < 0.0 {
            for v in coeffs.iter_mut() {
                *v = -*v;
            }
            rhs = -rhs;
            relation = relation.flipped();
        }
        rows.push(RowBuild {
            coeffs,
            relation,
            rhs,
        });
    }

    // 5. Variables auxiliares por fila
    let m = rows.len();
    let mut slack_cols = Vec::new();
    let mut surplus_cols = Vec::new();
    let mut artificial_cols = Vec::new();
    let mut basic_idx = vec![0usize; m];
    let mut row_added_columns = vec![Vec::new(); m];

    // (fila, columna, valor) de cada auxiliar, para llenar A después
    let mut aux_entries: Vec<(usize, usize, f64)> = Vec::new();
    let mut next_col = num_decision_cols;

    for (i, row) in rows.iter().enumerate() {
        match row.relation {
            Relation::LessOrEqual => {
                let s = next_col;
                next_col += 1;
                column_names.push(format!("s{}", slack_cols.len() + 1));
                slack_cols.push(s);
                aux_entries.push((i, s, 1.0));
                row_added_columns[i].push(s);
                basic_idx[i] = s;
            }
            Relation::GreaterOrEqual => {
                let r = next_col;
                next_col += 1;
                column_names.push(format!("r{}", surplus_cols.len() + 1));
                surplus_cols.push(r);
                aux_entries.push((i, r, -1.0));
                row_added_columns[i].push(r);

                let a = next_col;
                next_col += 1;
                column_names.push(format!("a{}", artificial_cols.len() + 1));
                artificial_cols.push(a);
                aux_entries.push((i, a, 1.0));
                row_added_columns[i].push(a);
                basic_idx[i] = a;
            }
            Relation::Equal => {
                let a = next_col;
                next_col += 1;
                column_names.push(format!("a{}", artificial_cols.len() + 1));
                artificial_cols.push(a);
                aux_entries.push((i, a, 1.0));
                row_added_columns[i].push(a);
                basic_idx[i] = a;
            }
        }
    }

    let n = next_col;

    // 6. Ensamblado de A, b, c y el objetivo de Fase I
    let mut a: DenseMatrix<f64> = crate::zeros!(m, n);
    let mut b = vec![0.0; m];
    for (i, row) in rows.iter().enumerate() {
        for (j, v) in row.coeffs.iter().enumerate() {
            a.set(i, j, *v);
        }
        b[i] = row.rhs;
    }
    for (i, j, v) in aux_entries {
        a.set(i, j, v);
    }

    let mut c = vec![0.0; n];
    c[..num_decision_cols].copy_from_slice(&obj);

    let mut c_phase_one = vec![0.0; n];
    for &j in &artificial_cols {
        c_phase_one[j] = -1.0;
    }

    let needs_phase_one = !artificial_cols.is_empty();

    let basic_set: std::collections::HashSet<usize> = basic_idx.iter().copied().collect();
    let non_basic_idx: Vec<usize> = (0..n).filter(|j| !basic_set.contains(j)).collect();

    // 7. Mapa de nombres
    let row_names: Vec<String> = model
        .constraints
        .iter()
        .enumerate()
        .map(|(i, c)| c.name.clone().unwrap_or_else(|| format!("c{}", i + 1)))
        .collect();

    Ok(CanonicalForm {
        a,
        b,
        c,
        z0: 0.0,
        basic_idx,
        non_basic_idx,
        needs_phase_one,
        c_phase_one,
        slack_cols,
        surplus_cols,
        artificial_cols,
        num_decision_cols,
        flip_objective: flip,
        names: NameMap {
            column_names,
            row_names,
            variable_columns,
            row_added_columns,
        },
    })
}

/// Forma de arranque para el simplex dual: todas las filas se llevan a <=
/// (el RHS puede quedar negativo) y la base inicial son las holguras.
/// Devuelve None si el modelo trae igualdades: ahí el arranque dual no aplica.
pub fn to_dual_start_form(model: &Model) -> Option<CanonicalForm> {
    model.validate().ok()?;
    if model
        .constraints
        .iter()
        .any(|c| c.relation == Relation::Equal)
    {
        return None;
    }

    let flip = model.direction == OptimizationDirection::Minimize;
    let sign = if flip { -1.0 } else { 1.0 };

    let (variable_columns, mut column_names, obj) = expand_variables(model, sign);
    let num_decision_cols = column_names.len();

    let m = model.constraints.len();
    let n = num_decision_cols + m;

    let mut a: DenseMatrix<f64> = crate::zeros!(m, n);
    let mut b = vec![0.0; m];
    let mut slack_cols = Vec::with_capacity(m);
    let mut basic_idx = vec![0usize; m];
    let mut row_added_columns = vec![Vec::new(); m];

    for (i, c) in model.constraints.iter().enumerate() {
        let mut coeffs = expand_row(&c.coeffs, &variable_columns, num_decision_cols);
        let mut rhs = c.rhs;
        if c.relation == Relation::GreaterOrEqual {
            // Fila >= multiplicada por -1: queda <= con RHS posiblemente negativo
            for v in coeffs.iter_mut() {
                *v = -*v;
            }
            rhs = -rhs;
        }
        for (j, v) in coeffs.iter().enumerate() {
            a.set(i, j, *v);
        }
        b[i] = rhs;

        let s = num_decision_cols + i;
        column_names.push(format!("s{}", i + 1));
        a.set(i, s, 1.0);
        slack_cols.push(s);
        basic_idx[i] = s;
        row_added_columns[i].push(s);
    }

    let mut c_vec = vec![0.0; n];
    c_vec[..num_decision_cols].copy_from_slice(&obj);

    let row_names: Vec<String> = model
        .constraints
        .iter()
        .enumerate()
        .map(|(i, c)| c.name.clone().unwrap_or_else(|| format!("c{}", i + 1)))
        .collect();

    Some(CanonicalForm {
        a,
        b,
        c: c_vec,
        z0: 0.0,
        basic_idx,
        non_basic_idx: (0..num_decision_cols).collect(),
        needs_phase_one: false,
        c_phase_one: vec![0.0; n],
        slack_cols,
        surplus_cols: Vec::new(),
        artificial_cols: Vec::new(),
        num_decision_cols,
        flip_objective: flip,
        names: NameMap {
            column_names,
            row_names,
            variable_columns,
            row_added_columns,
        },
    })
}
