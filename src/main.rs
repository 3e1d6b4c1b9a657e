use anyhow::Result;
use exam_practice::utils::logging;
use exam_practice::{App, Config, RunMode};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 解析运行模式：无参数批量提取，`<文件> [分钟]` 进入练习
    let mode = RunMode::from_args(std::env::args().skip(1))?;

    // 初始化并运行应用
    App::initialize(config).await?.run(mode).await?;

    Ok(())
}
