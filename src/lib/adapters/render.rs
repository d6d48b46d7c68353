use tera::{Context, Tera};
use crate::core::{Todo, TodoError};

/// Tera templates compiled into the binary. Autoescaping is on for `.html`.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self, TodoError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../../../templates/base.html")),
            ("index.html", include_str!("../../../templates/index.html")),
            ("edit.html", include_str!("../../../templates/edit.html")),
        ])?;
        Ok(Self { tera })
    }

    pub fn index(&self, todos: &[Todo]) -> Result<String, TodoError> {
        let mut context = Context::new();
        context.insert("todos", todos);
        Ok(self.tera.render("index.html", &context)?)
    }

    pub fn edit(&self, todo: &Todo) -> Result<String, TodoError> {
        let mut context = Context::new();
        context.insert("todo", todo);
        Ok(self.tera.render("edit.html", &context)?)
    }
}
