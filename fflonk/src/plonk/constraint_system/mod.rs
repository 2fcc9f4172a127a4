//! A vanilla PLONK constraint system with BSB22 commitment gates.
//!
//! Every row enforces
//! `ql·l + qr·r + qm·l·r + qo·o + qk + pi + Σ_j qcp_j·bsb_j = 0`.
//! The public inputs occupy the first rows. A commitment gate commits to a list
//! of variables: each committed row carries `ql = 1, qcp_j = −1`, and the hash of
//! the commitment is pinned by an extra row behaving like a public input.
use crate::errors::{PlonkError, Result};
use ark_bn254::Fr;
use ark_std::{format, vec, vec::Vec, One, Zero};

/// Index of a variable.
pub type VarIndex = usize;

/// Index of a gate, public-input rows excluded.
pub type CsIndex = usize;

/// The number of selectors of a gate: ql, qr, qm, qo, qk.
pub const N_SELECTORS: usize = 5;

/// The number of wires of a gate: l, r, o.
pub const N_WIRES_PER_GATE: usize = 3;

/// A BSB22 commitment to some variables of the circuit.
#[derive(Debug, Clone, Default)]
pub struct CommitmentGate {
    /// The gates holding the committed variables on their left wire.
    pub committed_gates: Vec<CsIndex>,
    /// The gate holding the hash of the commitment.
    pub output_gate: CsIndex,
    /// The variable receiving the hash of the commitment.
    pub output_var: VarIndex,
}

/// fflonk constraint system.
#[derive(Debug, Clone)]
pub struct FflonkCS {
    /// The selectors of the gates, public-input rows excluded.
    pub selectors: [Vec<Fr>; N_SELECTORS],
    /// The wiring of the gates, public-input rows excluded.
    pub wiring: [Vec<VarIndex>; N_WIRES_PER_GATE],
    /// The number of variables.
    pub num_vars: usize,
    /// The public witness variables indices.
    pub public_vars_witness_indices: Vec<VarIndex>,
    /// The commitment gates.
    pub commitment_gates: Vec<CommitmentGate>,
    /// A private witness for the circuit, cleared after computing a proof.
    pub witness: Vec<Fr>,
}

impl Default for FflonkCS {
    fn default() -> Self {
        Self::new()
    }
}

impl FflonkCS {
    /// Create a constraint system, with the variable 0 fixed to zero.
    pub fn new() -> FflonkCS {
        FflonkCS {
            selectors: [vec![], vec![], vec![], vec![], vec![]],
            wiring: [vec![], vec![], vec![]],
            num_vars: 1,
            public_vars_witness_indices: vec![],
            commitment_gates: vec![],
            witness: vec![Fr::zero()],
        }
    }

    /// 0-index is Zero
    pub fn zero_var(&self) -> VarIndex {
        0
    }

    /// Add a variable (with actual value `value`) into the constraint system.
    pub fn new_variable(&mut self, value: Fr) -> VarIndex {
        self.num_vars += 1;
        self.witness.push(value);
        self.num_vars - 1
    }

    /// The number of rows: public inputs followed by the gates.
    pub fn size(&self) -> usize {
        self.public_vars_witness_indices.len() + self.selectors[0].len()
    }

    /// The number of public inputs.
    pub fn num_public_inputs(&self) -> usize {
        self.public_vars_witness_indices.len()
    }

    /// Add a gate `ql·l + qr·r + qm·l·r + qo·o + qk = 0`, returning its index.
    pub fn insert_gate(
        &mut self,
        wires: [VarIndex; N_WIRES_PER_GATE],
        selectors: [Fr; N_SELECTORS],
    ) -> CsIndex {
        assert!(
            wires.iter().all(|&x| x < self.num_vars),
            "wire index out of bound"
        );
        for (column, q) in self.selectors.iter_mut().zip(selectors) {
            column.push(q);
        }
        for (column, w) in self.wiring.iter_mut().zip(wires) {
            column.push(w);
        }
        self.selectors[0].len() - 1
    }

    /// Add an Add gate. (left, right, out).
    pub fn insert_add_gate(&mut self, left_var: VarIndex, right_var: VarIndex, out_var: VarIndex) {
        let (one, zero) = (Fr::one(), Fr::zero());
        self.insert_gate([left_var, right_var, out_var], [one, one, zero, -one, zero]);
    }

    /// Add a Sub gate. (left, right, out).
    pub fn insert_sub_gate(&mut self, left_var: VarIndex, right_var: VarIndex, out_var: VarIndex) {
        let (one, zero) = (Fr::one(), Fr::zero());
        self.insert_gate([left_var, right_var, out_var], [one, -one, zero, -one, zero]);
    }

    /// Add a Mul gate. (left, right, out).
    pub fn insert_mul_gate(&mut self, left_var: VarIndex, right_var: VarIndex, out_var: VarIndex) {
        let (one, zero) = (Fr::one(), Fr::zero());
        self.insert_gate([left_var, right_var, out_var], [zero, zero, one, -one, zero]);
    }

    /// Add a constant constraint: var = constant.
    pub fn insert_constant_gate(&mut self, var: VarIndex, constant: Fr) {
        let zero = Fr::zero();
        self.insert_gate([var, 0, 0], [Fr::one(), zero, zero, zero, -constant]);
    }

    /// Add two variables into a new one.
    pub fn add(&mut self, left_var: VarIndex, right_var: VarIndex) -> VarIndex {
        let value = self.witness[left_var] + self.witness[right_var];
        let out_var = self.new_variable(value);
        self.insert_add_gate(left_var, right_var, out_var);
        out_var
    }

    /// Multiply two variables into a new one.
    pub fn mul(&mut self, left_var: VarIndex, right_var: VarIndex) -> VarIndex {
        let value = self.witness[left_var] * self.witness[right_var];
        let out_var = self.new_variable(value);
        self.insert_mul_gate(left_var, right_var, out_var);
        out_var
    }

    /// Mark a variable as a public input. Public inputs must be declared before any gate.
    pub fn prepare_pi_variable(&mut self, var: VarIndex) {
        assert!(var < self.num_vars, "variable index out of bound");
        assert!(
            self.selectors[0].is_empty(),
            "public inputs must be declared before the gates"
        );
        self.public_vars_witness_indices.push(var);
    }

    /// Commit to `vars`, returning a variable holding the hash of the commitment.
    /// Its value is only known once the prover has committed.
    pub fn commit_variables(&mut self, vars: &[VarIndex]) -> VarIndex {
        let zero = Fr::zero();
        let committed_gates = vars
            .iter()
            .map(|&var| self.insert_gate([var, 0, 0], [Fr::one(), zero, zero, zero, zero]))
            .collect();
        let output_var = self.new_variable(zero);
        let output_gate = self.insert_gate([output_var, 0, 0], [-Fr::one(), zero, zero, zero, zero]);
        self.commitment_gates.push(CommitmentGate {
            committed_gates,
            output_gate,
            output_var,
        });
        output_var
    }

    /// Pad the number of rows to a power of two.
    pub fn pad(&mut self) {
        let n = self.size().next_power_of_two().max(2);
        let diff = n - self.size();
        for selector in self.selectors.iter_mut() {
            selector.extend(vec![Fr::zero(); diff]);
        }
        for wire in self.wiring.iter_mut() {
            wire.extend(vec![0; diff]);
        }
    }

    /// The `i`-th selector over all the rows.
    pub fn selector_column(&self, i: usize) -> Vec<Fr> {
        let public = if i == 0 { -Fr::one() } else { Fr::zero() };
        let mut column = vec![public; self.num_public_inputs()];
        column.extend_from_slice(&self.selectors[i]);
        column
    }

    /// The `i`-th wire over all the rows.
    pub fn wire_column(&self, i: usize) -> Vec<VarIndex> {
        let mut column = if i == 0 {
            self.public_vars_witness_indices.clone()
        } else {
            vec![0; self.num_public_inputs()]
        };
        column.extend_from_slice(&self.wiring[i]);
        column
    }

    /// The selector `qcp_j` of the `j`-th commitment gate over all the rows.
    pub fn commitment_selector_column(&self, j: usize) -> Vec<Fr> {
        let mut column = vec![Fr::zero(); self.size()];
        for gate in &self.commitment_gates[j].committed_gates {
            column[self.num_public_inputs() + gate] = -Fr::one();
        }
        column
    }

    /// The gate index of each commitment hash.
    pub fn commitment_constraint_indices(&self) -> Vec<usize> {
        self.commitment_gates.iter().map(|g| g.output_gate).collect()
    }

    /// Compute the permutation implied by the copy constraints.
    pub fn compute_permutation(&self) -> Vec<usize> {
        let n = self.size();
        let mut perm = vec![0usize; N_WIRES_PER_GATE * n];
        let mut marked = vec![false; self.num_vars];
        let mut v = Vec::with_capacity(N_WIRES_PER_GATE * n);
        for i in 0..N_WIRES_PER_GATE {
            v.extend(self.wire_column(i));
        }
        // form a cycle for each variable value
        for (i, value) in v.iter().enumerate() {
            if marked[*value] {
                continue;
            }
            let first = i;
            let mut prev = i;
            for (j, current_value) in v[i + 1..].iter().enumerate() {
                if current_value == value {
                    perm[prev] = i + 1 + j;
                    prev = i + 1 + j;
                }
            }
            perm[prev] = first;
            marked[*value] = true
        }
        perm
    }

    /// The values of the public inputs in `witness`.
    pub fn public_inputs(&self, witness: &[Fr]) -> Vec<Fr> {
        self.public_vars_witness_indices
            .iter()
            .map(|&i| witness[i])
            .collect()
    }

    /// Verify the given witness, the commitment hashes taken from the witness itself.
    pub fn verify_witness(&self, witness: &[Fr]) -> Result<()> {
        if witness.len() != self.num_vars {
            return Err(PlonkError::Message(format!(
                "witness len = {}, num_vars = {}",
                witness.len(),
                self.num_vars
            )));
        }
        let nb_public = self.num_public_inputs();
        for gate in 0..self.selectors[0].len() {
            let [ql, qr, qm, qo, qk] = [0, 1, 2, 3, 4].map(|i| self.selectors[i][gate]);
            let [l, r, o] = [0, 1, 2].map(|i| witness[self.wiring[i][gate]]);
            let mut eval = ql * l + qr * r + qm * l * r + qo * o + qk;
            for cg in &self.commitment_gates {
                if cg.committed_gates.contains(&gate) {
                    eval -= l;
                }
                if cg.output_gate == gate {
                    eval += witness[cg.output_var];
                }
            }
            if !eval.is_zero() {
                return Err(PlonkError::Message(format!(
                    "cs index {}: gate is not satisfied",
                    nb_public + gate
                )));
            }
        }
        Ok(())
    }

    /// Extract and clear the entire witness of the circuit.
    pub fn get_and_clear_witness(&mut self) -> Vec<Fr> {
        let res = self.witness.clone();
        self.witness.clear();
        res
    }
}
