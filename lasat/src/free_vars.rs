//! Variables that are not fixed as real truths.
use crate::lit::Var;

/// Permutation of all variables with the free variables in front.
///
/// Fixing a variable swaps it to the end of the free prefix and shrinks the prefix. As variables
/// are freed again in reverse order, restoring only grows the prefix.
#[derive(Default)]
pub struct FreeVars {
    vars: Vec<Var>,
    position: Vec<usize>,
    free: usize,
}

impl FreeVars {
    /// Update structures for a new variable count, making all variables free.
    pub fn set_var_count(&mut self, count: usize) {
        self.vars = (0..count).map(Var::from_index).collect();
        self.position = (0..count).collect();
        self.free = count;
    }

    pub fn free_count(&self) -> usize {
        self.free
    }

    /// Free variables followed by the fixed variables in reverse order of fixing.
    pub fn vars(&self) -> &[Var] {
        &self.vars
    }

    /// The first free variable in list order.
    pub fn first(&self) -> Option<Var> {
        self.vars[..self.free].first().cloned()
    }

    pub fn is_free(&self, var: Var) -> bool {
        self.position[var.index()] < self.free
    }

    /// Remove a variable from the free prefix.
    pub fn remove(&mut self, var: Var) {
        debug_assert!(self.is_free(var));
        self.free -= 1;
        let last = self.vars[self.free];
        let pos = self.position[var.index()];
        self.vars[pos] = last;
        self.position[last.index()] = pos;
        self.vars[self.free] = var;
        self.position[var.index()] = self.free;
    }

    /// Return the most recently removed variable to the free prefix.
    pub fn restore(&mut self, var: Var) {
        assert_eq!(
            self.vars.get(self.free),
            Some(&var),
            "variables freed out of order"
        );
        self.free += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use lasat_formula::var;

    #[test]
    fn remove_and_restore() {
        let mut free_vars = FreeVars::default();
        free_vars.set_var_count(4);

        assert_eq!(free_vars.first(), Some(var!(1)));

        free_vars.remove(var!(1));
        free_vars.remove(var!(3));

        assert_eq!(free_vars.free_count(), 2);
        assert!(!free_vars.is_free(var!(1)));
        assert!(!free_vars.is_free(var!(3)));
        assert!(free_vars.is_free(var!(2)));
        assert!(free_vars.is_free(var!(4)));
        assert_eq!(&free_vars.vars()[2..], &[var!(3), var!(1)]);

        free_vars.restore(var!(3));
        assert!(free_vars.is_free(var!(3)));
        free_vars.restore(var!(1));
        assert_eq!(free_vars.free_count(), 4);

        let mut vars = free_vars.vars().to_vec();
        vars.sort();
        assert_eq!(vars, vec![var!(1), var!(2), var!(3), var!(4)]);
    }

    #[test]
    #[should_panic(expected = "variables freed out of order")]
    fn restore_checks_order() {
        let mut free_vars = FreeVars::default();
        free_vars.set_var_count(3);
        free_vars.remove(var!(1));
        free_vars.remove(var!(2));
        free_vars.restore(var!(1));
    }

    #[test]
    fn empty_prefix() {
        let mut free_vars = FreeVars::default();
        free_vars.set_var_count(1);
        free_vars.remove(var!(1));
        assert_eq!(free_vars.first(), None);
    }
}
