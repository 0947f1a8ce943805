//! Stable textual rendering of solution paths.

use std::rc::Rc;

use abacus_ast::Store;

use crate::model::Model;

/// One line per model: `[transform] <symbols> (cost: N)`.
///
/// Symbols are the refs' short names — composites stay opaque as `?k`.
/// This is the only output format hosts may rely on; the expanded
/// rendering in [`crate::Searcher::render`] is for humans and tests.
pub fn format_path(store: &Store, path: &[Rc<Model>]) -> String {
    let mut out = String::new();
    for model in path {
        let symbols: Vec<String> = model.refs.iter().map(|&id| store.symbol(id)).collect();
        out.push_str(&format!(
            "[{}] {} (cost: {})\n",
            model.transform.label(),
            symbols.join(" "),
            model.cost_so_far
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transform;

    #[test]
    fn test_lines_carry_transform_symbols_and_cost() {
        let mut store = Store::new();
        let four = store.num(4);
        let add = store.op(abacus_ast::OpKind::Add);
        let x = store.var("x");
        let root = Rc::new(Model::root(vec![four, add, x], 0));
        let child = Rc::new(Model::child(
            &root,
            Transform::Cleanup,
            vec![x],
            1,
            None,
            0,
        ));
        let text = format_path(&store, &child.path());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[initial] 4 + x (cost: 0)");
        assert_eq!(lines[1], "[cleanup] x (cost: 1)");
    }

    #[test]
    fn test_composites_stay_opaque() {
        let mut store = Store::new();
        let three = store.num(3);
        let mul = store.op(abacus_ast::OpKind::Mul);
        let four = store.num(4);
        let prod = store
            .intern(vec![three, mul, four], Some(abacus_ast::Compute::Mul))
            .unwrap();
        let root = Rc::new(Model::root(vec![prod], 0));
        let text = format_path(&store, &root.path());
        assert_eq!(text.lines().next().unwrap(), "[initial] ?0 (cost: 0)");
    }
}
