use super::load_components;
use crate::cli::ComponentsArgs;
use crate::error::Result;
use sanflow::core::components::ComponentSet;
use std::fmt::Write;

pub async fn run(args: ComponentsArgs) -> Result<()> {
    let components = load_components(args.library.as_deref())?;
    println!("{}", render_table(&components));
    Ok(())
}

pub fn render_table(components: &ComponentSet) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<12} {:<6} {:<12} {:<5} {:>6} {:>6} {:>6}  {}",
        "ID", "phase", "size", "deg.", "i_COD", "i_N", "i_P", "description"
    );
    for c in components.iter() {
        let _ = writeln!(
            out,
            "{:<12} {:<6} {:<12} {:<5} {:>6} {:>6} {:>6}  {}",
            c.id,
            c.phase.to_string(),
            c.particle_size.to_string(),
            c.degradability.to_string(),
            c.i_cod,
            c.i_n,
            c.i_p,
            c.description
        );
    }
    let _ = write!(out, "{} components", components.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use sanflow::core::components::household;

    #[test]
    fn table_lists_every_component() {
        let components = household().unwrap();
        let table = render_table(&components);
        assert_eq!(table.lines().count(), components.len() + 2);
        assert!(table.lines().any(|l| l.starts_with("CH4 ")));
        assert!(table.ends_with(&format!("{} components", components.len())));
    }
}
