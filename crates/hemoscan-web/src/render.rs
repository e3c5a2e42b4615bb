//! HTML pages, rendered with minijinja from templates compiled into the binary.

use minijinja::{context, Environment};

use hemoscan_common::ResultRecord;

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        env.add_template("base.html", include_str!("../templates/base.html"))?;
        env.add_template("upload.html", include_str!("../templates/upload.html"))?;
        env.add_template("results.html", include_str!("../templates/results.html"))?;
        env.add_template("error.html", include_str!("../templates/error.html"))?;
        Ok(Self { env })
    }

    pub fn upload_page(&self) -> Result<String, minijinja::Error> {
        self.env.get_template("upload.html")?.render(context! {})
    }

    pub fn results_page(&self, results: &[ResultRecord]) -> Result<String, minijinja::Error> {
        self.env
            .get_template("results.html")?
            .render(context! { results => results })
    }

    pub fn error_page(&self, error: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("error.html")?
            .render(context! { error => error })
    }
}
