use crate::cli::{Args, Process};
use crate::config::purge_with_config;

impl Process for Args {
    async fn process(self) -> anyhow::Result<i32> {
        let config = match self.to_config() {
            Ok(config) => config,
            Err(err) => {
                println!("{err}");
                return Ok(1);
            }
        };

        println!("rm {}", config.target);

        purge_with_config(&config).await?;

        println!("done");
        Ok(0)
    }
}
