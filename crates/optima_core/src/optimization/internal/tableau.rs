// src/optimization/internal/tableau.rs
//
// El tableau vive en una sola matriz densa de (m+1) x (n+1):
// la fila 0 es la fila z (costos reducidos) y la última columna el RHS.
// Invariante: las columnas básicas forman la identidad y su costo
// reducido es 0 en todo frontera de pivoteo.

use std::collections::HashSet;

use crate::formatting::scalar::{EPSILON, fmt_scalar, fractional_part};
use crate::linear_algebra::DenseMatrix;
use crate::optimization::error::LinearOptimizationError;
use crate::optimization::transformers::CanonicalForm;

#[derive(Debug, Clone)]
pub struct SimplexTableau {
    pub matrix: DenseMatrix<f64>,
    /// Columna básica asociada a cada fila de restricción
    pub basic_vars: Vec<usize>,
    /// Complemento de la base dentro de [0, n)
    pub non_basic_vars: Vec<usize>,
}

impl SimplexTableau {
    /// Número de filas de restricción (m)
    pub fn num_rows(&self) -> usize {
        self.matrix.rows - 1
    }

    /// Número de columnas estructurales (n), sin contar el RHS
    pub fn num_cols(&self) -> usize {
        self.matrix.cols - 1
    }

    /// Coeficiente de la fila de restricción `row` (0-based) en la columna `col`
    pub fn coeff(&self, row: usize, col: usize) -> f64 {
        self.matrix.get(row + 1, col)
    }

    /// RHS de la fila de restricción `row`
    pub fn rhs(&self, row: usize) -> f64 {
        self.matrix.get(row + 1, self.matrix.cols - 1)
    }

    /// Costo reducido de la columna `col` (entrada de la fila z)
    pub fn reduced_cost(&self, col: usize) -> f64 {
        self.matrix.get(0, col)
    }

    /// Valor actual del objetivo (esquina superior derecha)
    pub fn objective_value(&self) -> f64 {
        self.matrix.get(0, self.matrix.cols - 1)
    }

    /// Fila donde la columna es básica, si lo es
    pub fn basic_row_of(&self, col: usize) -> Option<usize> {
        self.basic_vars.iter().position(|&j| j == col)
    }

    /// Valor de una columna en la solución básica actual
    pub fn column_value(&self, col: usize) -> f64 {
        match self.basic_row_of(col) {
            Some(r) => self.rhs(r),
            None => 0.0,
        }
    }

    /// Arma el tableau desde la forma canónica y deja la fila z
    /// canonicalizada respecto de la base inicial.
    pub fn from_canonical(cf: &CanonicalForm, phase_one: bool) -> Self {
        let m = cf.num_rows();
        let n = cf.num_cols();
        let mut matrix = DenseMatrix::zeros(m + 1, n + 1);

        for r in 0..m {
            for j in 0..n {
                matrix.set(r + 1, j, cf.a.get(r, j));
            }
            matrix.set(r + 1, n, cf.b[r]);
        }

        let mut tableau = Self {
            matrix,
            basic_vars: cf.basic_idx.clone(),
            non_basic_vars: cf.non_basic_idx.clone(),
        };

        if phase_one {
            tableau.price_out(&cf.c_phase_one, 0.0);
        } else {
            tableau.price_out(&cf.c, cf.z0);
        }
        tableau
    }

    /// Reescribe la fila z como -c y le suma c_b por cada fila básica,
    /// de modo que el costo reducido de toda columna básica quede en 0.
    pub fn price_out(&mut self, c: &[f64], z0: f64) {
        let n = self.num_cols();
        let rhs_col = n;

        for j in 0..n {
            self.matrix.set(0, j, -c[j]);
        }
        self.matrix.set(0, rhs_col, z0);

        for r in 0..self.num_rows() {
            let cb = c[self.basic_vars[r]];
            if cb.abs() > EPSILON {
                for j in 0..=rhs_col {
                    let v = self.matrix.get(0, j) + cb * self.matrix.get(r + 1, j);
                    self.matrix.set(0, j, v);
                }
            }
        }
    }

    /// Ejecuta la operación de pivoteo sobre la fila de restricción
    /// `pivot_row` y la columna `pivot_col`.
    pub fn pivot(&mut self, pivot_row: usize, pivot_col: usize) -> Result<(), LinearOptimizationError> {
        let rows = self.matrix.rows;
        let cols = self.matrix.cols;
        let abs_row = pivot_row + 1;

        let pivot_val = self.matrix.get(abs_row, pivot_col);
        if pivot_val.abs() < 1e-12 {
            return Err(LinearOptimizationError::NumericalError(format!(
                "pivote cercano a cero en ({}, {})",
                pivot_row, pivot_col
            )));
        }

        // 1. Normalizar la fila pivote (pivote = 1.0)
        for j in 0..cols {
            let val = self.matrix.get(abs_row, j);
            self.matrix.set(abs_row, j, val / pivot_val);
        }

        // 2. Anular la columna pivote en el resto de filas (incluida la fila z)
        for i in 0..rows {
            if i != abs_row {
                let factor = self.matrix.get(i, pivot_col);
                if factor.abs() > 1e-12 {
                    for j in 0..cols {
                        let pivot_row_val = self.matrix.get(abs_row, j);
                        let current = self.matrix.get(i, j);
                        self.matrix.set(i, j, current - factor * pivot_row_val);
                    }
                }
            }
        }

        // 3. Actualizar la base
        self.basic_vars[pivot_row] = pivot_col;
        self.refresh_non_basic();

        Ok(())
    }

    /// Recalcula el complemento de la base.
    pub fn refresh_non_basic(&mut self) {
        let basic: HashSet<usize> = self.basic_vars.iter().copied().collect();
        self.non_basic_vars = (0..self.num_cols()).filter(|j| !basic.contains(j)).collect();
    }

    /// Verifica que la base registrada forme la identidad; si no,
    /// intenta detectar una base identidad columna por columna.
    pub fn detect_identity_basis(&mut self) -> bool {
        if self.is_identity_basis() {
            return true;
        }

        let m = self.num_rows();
        let n = self.num_cols();
        let mut found = vec![None; m];

        for j in 0..n {
            if let Some(r) = self.identity_row_of_column(j) {
                if found[r].is_none() {
                    found[r] = Some(j);
                }
            }
        }

        if found.iter().all(|f| f.is_some()) {
            self.basic_vars = found.into_iter().flatten().collect();
            self.refresh_non_basic();
            true
        } else {
            false
        }
    }

    fn is_identity_basis(&self) -> bool {
        self.basic_vars.len() == self.num_rows()
            && self
                .basic_vars
                .iter()
                .enumerate()
                .all(|(r, &j)| self.identity_row_of_column(j) == Some(r))
    }

    /// Si la columna es e_r en las filas de restricción, devuelve r.
    fn identity_row_of_column(&self, col: usize) -> Option<usize> {
        let mut unit_row = None;
        for r in 0..self.num_rows() {
            let v = self.coeff(r, col);
            if (v - 1.0).abs() <= EPSILON {
                if unit_row.is_some() {
                    return None;
                }
                unit_row = Some(r);
            } else if v.abs() > EPSILON {
                return None;
            }
        }
        unit_row
    }

    /// Agrega una columna estructural (antes del RHS) y una fila en cero,
    /// copiando el contenido existente.
    fn grow_one(&mut self) -> (usize, usize) {
        let m = self.num_rows();
        let n = self.num_cols();
        let mut next = DenseMatrix::zeros(m + 2, n + 2);

        for r in 0..=m {
            for j in 0..n {
                next.set(r, j, self.matrix.get(r, j));
            }
            // El RHS se corre una columna a la derecha
            next.set(r, n + 1, self.matrix.get(r, n));
        }

        self.matrix = next;
        (n, m)
    }

    /// Inyecta la fila de ramificación x_col <= bound (upper) o
    /// x_col >= bound, como fila dual-factible con RHS <= 0, con una
    /// columna de holgura/exceso nueva que entra a la base.
    pub fn inject_bound_row(
        &mut self,
        col: usize,
        bound: f64,
        upper: bool,
    ) -> Result<usize, LinearOptimizationError> {
        let src = self.basic_row_of(col).ok_or_else(|| {
            LinearOptimizationError::ValidationError(format!(
                "no se puede ramificar: la columna {} no es básica",
                col
            ))
        })?;

        let (new_col, new_row) = self.grow_one();
        let n = self.num_cols();
        let rhs_col = n;

        // Fila nueva = fila fuente - esqueleto (x_col ± s_new = bound)
        let s_coeff = if upper { 1.0 } else { -1.0 };
        let mut row_vals = vec![0.0; n + 1];
        for j in 0..n {
            let skeleton = if j == col {
                1.0
            } else if j == new_col {
                s_coeff
            } else {
                0.0
            };
            row_vals[j] = self.coeff(src, j) - skeleton;
        }
        row_vals[rhs_col] = self.rhs(src) - bound;

        // RHS positivo: se multiplica por -1 para que quede dual-factible
        if row_vals[rhs_col] > 0.0 {
            for v in row_vals.iter_mut() {
                *v = -*v;
            }
        }

        for (j, v) in row_vals.iter().enumerate() {
            self.matrix.set(new_row + 1, j, *v);
        }
        // La fila z no se toca: la columna nueva nace con costo reducido 0

        self.basic_vars.push(new_col);
        self.refresh_non_basic();
        Ok(new_row)
    }

    /// Volcado alineado del tableau para la bitácora en modo verbose:
    /// encabezado de columnas, fila z y una fila por variable básica.
    pub fn render(&self, names: &[String]) -> Vec<String> {
        let n = self.num_cols();
        let label = |j: usize| -> String {
            names
                .get(j)
                .cloned()
                .unwrap_or_else(|| format!("t{}", j + 1))
        };

        let mut header = format!("{:>8}", "base");
        for j in 0..n {
            header.push_str(&format!("{:>9}", label(j)));
        }
        header.push_str(&format!("{:>9}", "RHS"));

        let mut lines = vec![header];
        let mut z_line = format!("{:>8}", "z");
        for j in 0..=n {
            z_line.push_str(&format!("{:>9}", fmt_scalar(self.matrix.get(0, j))));
        }
        lines.push(z_line);

        for r in 0..self.num_rows() {
            let mut line = format!("{:>8}", label(self.basic_vars[r]));
            for j in 0..=n {
                line.push_str(&format!("{:>9}", fmt_scalar(self.matrix.get(r + 1, j))));
            }
            lines.push(line);
        }
        lines
    }

    /// Extiende el tableau con un corte fraccionario de Gomory derivado
    /// de la fila `src_row`. Devuelve el índice de la fila nueva.
    pub fn append_gomory_cut(&mut self, src_row: usize) -> usize {
        let f0 = fractional_part(self.rhs(src_row));

        let (new_col, new_row) = self.grow_one();
        let n = self.num_cols();
        let rhs_col = n;

        let basic: HashSet<usize> = self.basic_vars.iter().copied().collect();
        for j in 0..n {
            let v = if j == new_col {
                1.0
            } else if basic.contains(&j) {
                0.0
            } else {
                -fractional_part(self.coeff(src_row, j))
            };
            self.matrix.set(new_row + 1, j, v);
        }
        self.matrix.set(new_row + 1, rhs_col, -f0);

        self.basic_vars.push(new_col);
        self.refresh_non_basic();
        new_row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::model::{
        Constraint, Model, OptimizationDirection, Relation, Variable,
    };
    use crate::optimization::transformers::to_canonical_form;

    fn production_tableau() -> SimplexTableau {
        let mut model = Model::new("Prod", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0));
        model.add_variable(Variable::new("x2", 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![0.0, 2.0], Relation::LessOrEqual, 12.0));
        model.add_constraint(Constraint::new(vec![3.0, 2.0], Relation::LessOrEqual, 18.0));
        let cf = to_canonical_form(&model).expect("Modelo válido");
        SimplexTableau::from_canonical(&cf, false)
    }

    #[test]
    fn test_from_canonical_prices_out_basis() {
        let tab = production_tableau();

        // Fila z: -c en columnas de decisión, 0 en las básicas
        assert_eq!(tab.reduced_cost(0), -3.0);
        assert_eq!(tab.reduced_cost(1), -5.0);
        for &j in &tab.basic_vars {
            assert!(tab.reduced_cost(j).abs() < 1e-12);
        }
        assert_eq!(tab.objective_value(), 0.0);
    }

    #[test]
    fn test_pivot_keeps_identity_invariant() {
        let mut tab = production_tableau();

        // Entra x2 por la fila 1 (2*x2 = 12)
        tab.pivot(1, 1).expect("Pivote válido");

        assert_eq!(tab.basic_vars[1], 1);
        // Columna pivote: 1 en su fila, 0 en el resto (incluida la fila z)
        assert!((tab.coeff(1, 1) - 1.0).abs() < 1e-12);
        assert!(tab.coeff(0, 1).abs() < 1e-12);
        assert!(tab.coeff(2, 1).abs() < 1e-12);
        assert!(tab.reduced_cost(1).abs() < 1e-12);
        // RHS actualizado: z = 30 tras entrar x2 = 6
        assert!((tab.rhs(1) - 6.0).abs() < 1e-12);
        assert!((tab.objective_value() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn test_pivot_near_zero_fails() {
        let mut tab = production_tableau();
        // El coeficiente (0, 1) es 0: no es un pivote legal
        assert!(tab.pivot(0, 1).is_err());
    }

    #[test]
    fn test_detect_identity_basis_recovers() {
        let mut tab = production_tableau();
        // Olvidamos la base registrada a propósito
        tab.basic_vars = vec![0, 0, 0];
        assert!(tab.detect_identity_basis());
        assert_eq!(tab.basic_vars, vec![2, 3, 4]);
    }

    #[test]
    fn test_inject_upper_bound_row_is_dual_feasible() {
        let mut tab = production_tableau();
        tab.pivot(1, 1).expect("x2 entra");
        tab.pivot(2, 0).expect("x1 entra");
        // Óptimo del ejemplo clásico: x1 = 2, x2 = 6

        let n_before = tab.num_cols();
        let new_row = tab.inject_bound_row(0, 1.0, true).expect("x1 es básica");

        assert_eq!(tab.num_cols(), n_before + 1);
        // RHS de la fila inyectada <= 0 (1 - 2 = -1)
        assert!(tab.rhs(new_row) <= 0.0);
        assert!((tab.rhs(new_row) + 1.0).abs() < 1e-9);
        // La columna nueva es básica en la fila nueva con coeficiente +1
        let new_col = *tab.basic_vars.last().unwrap();
        assert!((tab.coeff(new_row, new_col) - 1.0).abs() < 1e-12);
        // Y nace con costo reducido 0
        assert!(tab.reduced_cost(new_col).abs() < 1e-12);
    }

    #[test]
    fn test_render_shows_basis_and_rhs() {
        let mut model = Model::new("Prod", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 3.0));
        model.add_variable(Variable::new("x2", 5.0));
        model.add_constraint(Constraint::new(vec![1.0, 0.0], Relation::LessOrEqual, 4.0));
        model.add_constraint(Constraint::new(vec![0.0, 2.0], Relation::LessOrEqual, 12.0));
        let cf = to_canonical_form(&model).expect("Modelo válido");
        let tab = SimplexTableau::from_canonical(&cf, false);

        let lines = tab.render(&cf.names.column_names);

        // Encabezado + fila z + una fila por restricción
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("x1"));
        assert!(lines[0].contains("RHS"));
        assert!(lines[1].trim_start().starts_with('z'));
        assert!(lines[2].contains("s1"));
        assert!(lines[2].contains('4'));
    }

    #[test]
    fn test_gomory_cut_has_negative_rhs() {
        // Tableau pequeño con RHS fraccionario: max x1, 2x1 <= 3
        let mut model = Model::new("Frac", OptimizationDirection::Maximize);
        model.add_variable(Variable::new("x1", 1.0));
        model.add_constraint(Constraint::new(vec![2.0], Relation::LessOrEqual, 3.0));
        let cf = to_canonical_form(&model).expect("Modelo válido");
        let mut tab = SimplexTableau::from_canonical(&cf, false);
        tab.pivot(0, 0).expect("x1 entra");
        assert!((tab.rhs(0) - 1.5).abs() < 1e-12);

        let cut_row = tab.append_gomory_cut(0);

        // RHS del corte: -f0 = -0.5
        assert!((tab.rhs(cut_row) + 0.5).abs() < 1e-12);
        // Coeficiente de la holgura original: -frac(0.5) = -0.5
        assert!((tab.coeff(cut_row, 1) + 0.5).abs() < 1e-12);
        // La columna del corte es básica con +1
        let cut_col = *tab.basic_vars.last().unwrap();
        assert!((tab.coeff(cut_row, cut_col) - 1.0).abs() < 1e-12);
    }
}
