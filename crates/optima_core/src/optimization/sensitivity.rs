// src/optimization/sensitivity.rs
//
// Análisis post-óptimo a partir de la base final: precios sombra
// y = c_B' B⁻¹, costos reducidos r_j = c_j - y'a_j, rangos de costo
// para no básicas y construcción del modelo dual.

use crate::formatting::scalar::INT_TOL;
use crate::linear_algebra::DenseMatrix;
use crate::linear_algebra::error::LinearAlgebraError;
use crate::optimization::error::LinearOptimizationError;
use crate::optimization::internal::SimplexTableau;
use crate::optimization::model::{
    Constraint, Model, OptimizationDirection, Relation, Variable,
};
use crate::optimization::transformers::CanonicalForm;

/// Fotografía del óptimo de Fase II: todo lo necesario para responder
/// preguntas de sensibilidad sin volver a resolver.
#[derive(Debug, Clone)]
pub struct SensitivityPayload {
    /// A, b y c canónicos (sin columnas artificiales)
    pub a: DenseMatrix<f64>,
    pub b: Vec<f64>,
    pub c: Vec<f64>,

    pub basic_idx: Vec<usize>,
    pub non_basic_idx: Vec<usize>,

    /// B: submatriz de A en las columnas básicas
    pub basis: DenseMatrix<f64>,
    pub basis_inverse: DenseMatrix<f64>,
    pub c_basic: Vec<f64>,
    /// Valores de las variables básicas (RHS del tableau final)
    pub basic_values: Vec<f64>,
    /// y = c_B' B⁻¹, en la convención interna de maximización
    pub shadow_prices: Vec<f64>,

    pub num_decision_cols: usize,
    /// El modelo original era MIN: los reportes invierten el signo
    pub flipped: bool,
    /// MAX con todo <= o MIN con todo >= (x >= 0): rangos exactos
    pub canonical_shape: bool,

    pub column_names: Vec<String>,
    pub row_names: Vec<String>,
}

/// Entrada del reporte de precios sombra: una por restricción.
#[derive(Debug, Clone, PartialEq)]
pub struct ShadowPrice {
    pub name: String,
    pub rhs: f64,
    pub price: f64,
}

/// Variable de decisión no básica con su costo reducido.
#[derive(Debug, Clone, PartialEq)]
pub struct NonBasicEntry {
    pub column: String,
    pub reduced_cost: f64,
}

/// Rango de costo que preserva la base para una columna no básica.
#[derive(Debug, Clone)]
pub struct CostRange {
    pub column: String,
    pub cost: f64,
    pub reduced_cost: f64,
    pub y_dot_a: f64,
    /// None = sin límite en esa dirección
    pub allowable_increase: Option<f64>,
    pub allowable_decrease: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub note: Option<String>,
}

/// Captura el payload sobre un tableau óptimo de Fase II.
/// Una base singular se reporta como error (el caller lo degrada a nota).
pub fn capture(
    cf: &CanonicalForm,
    tableau: &SimplexTableau,
    canonical_shape: bool,
) -> Result<SensitivityPayload, LinearAlgebraError> {
    let m = cf.num_rows();

    let mut basis = DenseMatrix::zeros(m, m);
    for (k, &j) in tableau.basic_vars.iter().take(m).enumerate() {
        for i in 0..m {
            basis.set(i, k, cf.a.get(i, j));
        }
    }
    let basis_inverse = basis.inverse()?;

    let c_basic: Vec<f64> = tableau
        .basic_vars
        .iter()
        .take(m)
        .map(|&j| cf.c[j])
        .collect();

    // y_i = Σ_k c_B[k] * B⁻¹[k][i]
    let mut shadow_prices = vec![0.0; m];
    for i in 0..m {
        let mut acc = 0.0;
        for k in 0..m {
            acc += c_basic[k] * basis_inverse.get(k, i);
        }
        shadow_prices[i] = acc;
    }

    let basic_values: Vec<f64> = (0..m).map(|r| tableau.rhs(r)).collect();

    Ok(SensitivityPayload {
        a: cf.a.clone(),
        b: cf.b.clone(),
        c: cf.c.clone(),
        basic_idx: tableau.basic_vars[..m].to_vec(),
        non_basic_idx: tableau.non_basic_vars.clone(),
        basis,
        basis_inverse,
        c_basic,
        basic_values,
        shadow_prices,
        num_decision_cols: cf.num_decision_cols,
        flipped: cf.flip_objective,
        canonical_shape,
        column_names: cf.names.column_names.clone(),
        row_names: cf.names.row_names.clone(),
    })
}

impl SensitivityPayload {
    /// r_j = c_j - y'a_j en la convención interna de maximización
    pub fn reduced_cost(&self, col: usize) -> f64 {
        let mut y_dot_a = 0.0;
        for i in 0..self.a.rows {
            y_dot_a += self.shadow_prices[i] * self.a.get(i, col);
        }
        self.c[col] - y_dot_a
    }

    pub fn is_basic(&self, col: usize) -> bool {
        self.basic_idx.contains(&col)
    }

    fn user_sign(&self) -> f64 {
        if self.flipped { -1.0 } else { 1.0 }
    }
}

/// Una entrada por restricción: {nombre, RHS, precio sombra}.
pub fn shadow_prices(payload: &SensitivityPayload) -> Vec<ShadowPrice> {
    let sign = payload.user_sign();
    payload
        .row_names
        .iter()
        .enumerate()
        .map(|(i, name)| ShadowPrice {
            name: name.clone(),
            rhs: payload.b[i],
            price: sign * payload.shadow_prices[i],
        })
        .collect()
}

/// Variables de decisión no básicas con su costo reducido (signo del usuario).
pub fn nonbasic_variables(payload: &SensitivityPayload) -> Vec<NonBasicEntry> {
    let sign = payload.user_sign();
    payload
        .non_basic_idx
        .iter()
        .filter(|&&j| j < payload.num_decision_cols)
        .map(|&j| NonBasicEntry {
            column: payload.column_names[j].clone(),
            reduced_cost: sign * payload.reduced_cost(j),
        })
        .collect()
}

/// Rango del coeficiente de costo de una columna no básica que
/// preserva la base óptima actual.
pub fn range_for(
    payload: &SensitivityPayload,
    col: usize,
) -> Result<CostRange, LinearOptimizationError> {
    if col >= payload.num_decision_cols {
        return Err(LinearOptimizationError::ValidationError(format!(
            "la columna {} no es una variable de decisión",
            col
        )));
    }
    if payload.is_basic(col) {
        return Err(LinearOptimizationError::ValidationError(format!(
            "la variable {} es básica; el rango aplica a no básicas",
            payload.column_names[col]
        )));
    }

    let r_engine = payload.reduced_cost(col);
    let mut y_dot_a = 0.0;
    for i in 0..payload.a.rows {
        y_dot_a += payload.shadow_prices[i] * payload.a.get(i, col);
    }

    let note = if payload.canonical_shape {
        None
    } else {
        Some("forma no canónica: reporte de mejor esfuerzo".to_string())
    };

    let range = if !payload.flipped {
        // MAX con <=: la base sigue óptima mientras r_j <= 0
        let cost = payload.c[col];
        let delta = (-r_engine).max(0.0);
        CostRange {
            column: payload.column_names[col].clone(),
            cost,
            reduced_cost: r_engine,
            y_dot_a,
            allowable_increase: Some(delta),
            allowable_decrease: None,
            lower: None,
            upper: Some(cost + delta),
            note,
        }
    } else {
        // MIN con >=: en el espacio del usuario r_j >= 0 y el coeficiente
        // puede bajar hasta agotar el costo reducido
        let cost = -payload.c[col];
        let r_user = -r_engine;
        let delta = r_user.max(0.0);
        CostRange {
            column: payload.column_names[col].clone(),
            cost,
            reduced_cost: r_user,
            y_dot_a: -y_dot_a,
            allowable_increase: None,
            allowable_decrease: Some(delta),
            lower: Some(cost - delta),
            upper: None,
            note,
        }
    };

    Ok(range)
}

/// Construye el modelo dual para las formas canónicas:
/// MAX todo <= (x >= 0)  ->  MIN b'y con A'y >= c, y >= 0
/// MIN todo >= (x >= 0)  ->  MAX b'y con A'y <= c, y >= 0
pub fn build_dual(model: &Model) -> Result<Model, LinearOptimizationError> {
    model.validate()?;
    if !model.canonical_dual_shape() {
        return Err(LinearOptimizationError::UnsupportedShape(
            "la dualidad directa requiere MAX con todo <= o MIN con todo >= (x >= 0)".to_string(),
        ));
    }

    let (dual_direction, dual_relation) = match model.direction {
        OptimizationDirection::Maximize => {
            (OptimizationDirection::Minimize, Relation::GreaterOrEqual)
        }
        OptimizationDirection::Minimize => {
            (OptimizationDirection::Maximize, Relation::LessOrEqual)
        }
    };

    let mut dual = Model::new(&format!("{}_dual", model.name), dual_direction);

    for (i, c) in model.constraints.iter().enumerate() {
        dual.add_variable(Variable::new(&format!("y{}", i + 1), c.rhs));
    }

    // Una restricción dual por variable primal: columna j de A contra c_j
    for (j, v) in model.variables.iter().enumerate() {
        let coeffs: Vec<f64> = model.constraints.iter().map(|c| c.coeffs[j]).collect();
        dual.add_constraint(
            Constraint::new(coeffs, dual_relation, v.objective_coeff)
                .with_name(&format!("d{}", j + 1)),
        );
    }

    Ok(dual)
}

/// Verificación de dualidad fuerte entre dos valores óptimos.
pub fn strong_duality_holds(primal: f64, dual: f64) -> bool {
    (primal - dual).abs() < INT_TOL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::algorithms::primal_simplex;
    use crate::optimization::settings::SolverSettings;

    fn production_model() -> Model {
        let mut model = Model::new("Prod", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0));
        model.add_variable(Variable::new("x2", 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![0.0, 2.0], Relation::LessOrEqual, 12.0));
        model.add_constraint(Constraint::new(vec![3.0, 2.0], Relation::LessOrEqual, 18.0));
        model
    }

    #[test]
    fn test_shadow_prices_production() {
        let result = primal_simplex::solve(&production_model(), &SolverSettings::default())
            .expect("Resuelve");
        let payload = result.sensitivity.as_ref().expect("Con sensibilidad");

        let prices = shadow_prices(payload);
        assert_eq!(prices.len(), 3);
        assert!((prices[0].price - 0.0).abs() < 1e-6);
        assert!((prices[1].price - 1.5).abs() < 1e-6);
        assert!((prices[2].price - 1.0).abs() < 1e-6);
        assert_eq!(prices[0].name, "c1");
    }

    #[test]
    fn test_strong_duality_on_production() {
        let settings = SolverSettings::default();
        let primal = primal_simplex::solve(&production_model(), &settings).expect("Primal");
        let dual_model = build_dual(&production_model()).expect("Forma canónica");
        let dual = primal_simplex::solve(&dual_model, &settings).expect("Dual");

        let zp = primal.objective.expect("Óptimo primal");
        let zd = dual.objective.expect("Óptimo dual");
        assert!(
            strong_duality_holds(zp, zd),
            "Brecha de dualidad: {} vs {}",
            zp,
            zd
        );
    }

    #[test]
    fn test_dual_of_min_model() {
        let mut model = Model::new("Dieta", OptimizationDirection::Minimize);
        model.add_variable(Variable::new("x1", 6.0));
        model.add_variable(Variable::new("x2", 8.0));
        model.add_constraint(Constraint::new(vec![3.0, 1.0], Relation::GreaterOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![1.0, 2.0], Relation::GreaterOrEqual, 4.0));

        let dual = build_dual(&model).expect("Forma canónica");

        assert_eq!(dual.direction, OptimizationDirection::Maximize);
        assert_eq!(dual.num_variables(), 2);
        assert_eq!(dual.constraints.len(), 2);
        assert_eq!(dual.constraints[0].relation, Relation::LessOrEqual);
        // Columna 1 de A: (3, 1) contra c1 = 6
        assert_eq!(dual.constraints[0].coeffs, vec![3.0, 1.0]);
        assert_eq!(dual.constraints[0].rhs, 6.0);
    }

    #[test]
    fn test_build_dual_rejects_mixed_relations() {
        let mut model = production_model();
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::GreaterOrEqual, 1.0));

        match build_dual(&model) {
            Err(LinearOptimizationError::UnsupportedShape(_)) => {}
            other => panic!("Esperaba forma no soportada, obtuve {:?}", other),
        }
    }

    #[test]
    fn test_range_for_nonbasic_slack_alignment() {
        // En el óptimo de producción, x1 y x2 son básicas; las no básicas
        // son holguras. Pedimos el rango de una columna de decisión en un
        // modelo donde x2 queda fuera de la base.
        let mut model = Model::new("RangoNB", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 5.0));
        model.add_variable(Variable::new("x2", 1.0));
        model.add_constraint(Constraint::new(vec![1.0, 1.0], Relation::LessOrEqual, 10.0));

        let result =
            primal_simplex::solve(&model, &SolverSettings::default()).expect("Resuelve");
        let payload = result.sensitivity.as_ref().expect("Con sensibilidad");

        // x2 (columna 1) queda no básica con r = 1 - 5 = -4
        let range = range_for(payload, 1).expect("No básica");
        assert!((range.reduced_cost + 4.0).abs() < 1e-6);
        assert!((range.allowable_increase.unwrap() - 4.0).abs() < 1e-6);
        // El coeficiente puede subir hasta 5 sin mover la base
        assert!((range.upper.unwrap() - 5.0).abs() < 1e-6);
        assert!(range.allowable_decrease.is_none());
        assert!(range.note.is_none());
    }

    #[test]
    fn test_range_for_basic_variable_is_error() {
        let result = primal_simplex::solve(&production_model(), &SolverSettings::default())
            .expect("Resuelve");
        let payload = result.sensitivity.as_ref().expect("Con sensibilidad");

        // x1 es básica en el óptimo
        assert!(range_for(payload, 0).is_err());
    }
}
