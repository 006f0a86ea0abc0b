use anyhow::Result;
use pgt::run::{eval, train, RunConfig};
use pgt_core::TrainerConfig;
use tempdir::TempDir;

fn config() -> RunConfig {
    let mut config = RunConfig::default();
    config.env = config.env.max_steps(20);
    config.agent = config
        .agent
        .minibatch_size(8)
        .replay_start_size(16)
        .target_update_interval(10);
    config.trainer = TrainerConfig::default()
        .max_opts(30)
        .eval_interval(10)
        .record_interval(5)
        .save_interval(15);
    config.n_episodes_per_eval = 1;
    config
}

#[test]
fn test_pgt_point_mass() -> Result<()> {
    let model_dir = TempDir::new("pgt_point_mass")?;
    let config = config();
    train(&config, model_dir.path())?;

    assert!(model_dir.path().join("config.yaml").exists());
    for dir in ["best", "15", "30"] {
        let dir = model_dir.path().join(dir);
        assert!(dir.join("model").join("q_function.safetensors").exists());
        assert!(dir.join("target_model").join("policy.safetensors").exists());
        assert!(dir.join("actor_optimizer.yaml").exists());
        assert!(dir.join("critic_optimizer.yaml").exists());
    }

    let mean_return = eval(&config, &model_dir.path().join("best"), 2)?;
    assert!(mean_return.is_finite());
    assert!(mean_return <= 0.0);
    Ok(())
}

#[test]
fn test_serde_run_config() -> Result<()> {
    let dir = TempDir::new("run_config")?;
    let path = dir.path().join("config.yaml");
    let config = config();
    config.save(&path)?;
    assert_eq!(RunConfig::load(&path)?, config);
    Ok(())
}
