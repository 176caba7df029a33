use crate::core::prompt::PromptTemplate;
use crate::domain::model::{ChatMessage, StepResult};
use crate::domain::ports::ChatModel;
use crate::utils::error::{AgentError, Result};
use crate::utils::monitor::SystemMonitor;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// 鏈執行上下文，用於在步驟間傳遞變數
#[derive(Debug, Clone)]
pub struct ChainContext {
    pub execution_id: String,
    pub variables: HashMap<String, String>,
    pub previous_results: Vec<StepResult>,
}

impl ChainContext {
    pub fn new(execution_id: String) -> Self {
        Self {
            execution_id,
            variables: HashMap::new(),
            previous_results: Vec::new(),
        }
    }

    pub fn with_variables(mut self, variables: HashMap<String, String>) -> Self {
        self.variables.extend(variables);
        self
    }

    pub fn set_variable(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    pub fn get_variable(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// 獲取上一個步驟的結果
    pub fn get_previous_result(&self) -> Option<&StepResult> {
        self.previous_results.last()
    }

    pub fn get_result_by_name(&self, name: &str) -> Option<&StepResult> {
        self.previous_results.iter().find(|r| r.step_name == name)
    }

    /// 加入結果，並以 output_key 寫入變數供後續步驟使用
    pub fn add_result(&mut self, result: StepResult) {
        self.set_variable(result.output_key.clone(), result.text.clone());
        self.previous_results.push(result);
    }
}

/// 模型回覆的解析方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputParser {
    /// 去除前後空白
    Text,
    /// 只取名稱：第一個非空行，去掉引號、粗體符號與句點
    Name,
}

impl OutputParser {
    pub fn parse(&self, raw: &str) -> String {
        match self {
            OutputParser::Text => raw.trim().to_string(),
            OutputParser::Name => {
                let mut name = raw
                    .lines()
                    .map(str::trim)
                    .find(|line| !line.is_empty())
                    .unwrap_or("");

                // 反覆修剪直到不再變化，處理 "Lisboa". 與 **Lisboa.** 等組合
                loop {
                    let trimmed = name
                        .trim()
                        .trim_matches(|c: char| matches!(c, '"' | '\'' | '*' | '“' | '”' | '`'));
                    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
                    if trimmed == name {
                        break;
                    }
                    name = trimmed;
                }
                name.to_string()
            }
        }
    }
}

/// 鏈中的單一步驟
#[async_trait::async_trait]
pub trait ChainStep: Send + Sync {
    fn name(&self) -> &str;

    /// 輸出寫入上下文時使用的變數名稱
    fn output_key(&self) -> &str;

    fn should_execute(&self, _context: &ChainContext) -> bool {
        true
    }

    async fn run(&self, model: &dyn ChatModel, context: &ChainContext) -> Result<String>;
}

/// 以模板組出訊息並呼叫模型的步驟
#[derive(Debug, Clone)]
pub struct PromptStep {
    name: String,
    output_key: String,
    system: Option<PromptTemplate>,
    template: PromptTemplate,
    parser: OutputParser,
}

impl PromptStep {
    pub fn new(name: impl Into<String>, template: PromptTemplate) -> Self {
        let name = name.into();
        Self {
            output_key: name.clone(),
            name,
            system: None,
            template,
            parser: OutputParser::Text,
        }
    }

    pub fn with_system(mut self, system: PromptTemplate) -> Self {
        self.system = Some(system);
        self
    }

    pub fn with_output_key(mut self, key: impl Into<String>) -> Self {
        self.output_key = key.into();
        self
    }

    pub fn with_parser(mut self, parser: OutputParser) -> Self {
        self.parser = parser;
        self
    }

    /// 依上下文產生要送出的訊息
    pub fn build_messages(&self, context: &ChainContext) -> Result<Vec<ChatMessage>> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system {
            messages.push(ChatMessage::system(system.render(&context.variables)?));
        }
        messages.push(ChatMessage::user(self.template.render(&context.variables)?));
        Ok(messages)
    }
}

#[async_trait::async_trait]
impl ChainStep for PromptStep {
    fn name(&self) -> &str {
        &self.name
    }

    fn output_key(&self) -> &str {
        &self.output_key
    }

    async fn run(&self, model: &dyn ChatModel, context: &ChainContext) -> Result<String> {
        let messages = self.build_messages(context)?;
        tracing::debug!("💬 {}: sending {} messages", self.name, messages.len());

        let raw = model.complete(&messages).await?;
        let parsed = self.parser.parse(&raw);
        if parsed.is_empty() {
            return Err(AgentError::EmptyCompletion {
                step: self.name.clone(),
            });
        }
        Ok(parsed)
    }
}

/// 提示鏈，依序執行各步驟
pub struct PromptChain {
    name: String,
    steps: Vec<Box<dyn ChainStep>>,
    monitor: Option<SystemMonitor>,
    runs: AtomicU64,
}

impl PromptChain {
    pub fn new(name: String) -> Self {
        Self {
            name,
            steps: Vec::new(),
            monitor: None,
            runs: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// 每次執行產生新的 ID：鏈名稱、時間戳與執行序號
    fn next_execution_id(&self) -> String {
        let run = self.runs.fetch_add(1, Ordering::Relaxed) + 1;
        format!(
            "{}-{}-{}",
            self.name,
            chrono::Utc::now().format("%Y%m%d%H%M%S"),
            run
        )
    }

    /// 啟用或禁用系統監控
    pub fn with_monitoring(mut self, enabled: bool) -> Self {
        self.monitor = enabled.then(|| SystemMonitor::new(true));
        self
    }

    pub fn add_step(&mut self, step: Box<dyn ChainStep>) {
        self.steps.push(step);
    }

    pub fn step(mut self, step: impl ChainStep + 'static) -> Self {
        self.add_step(Box::new(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// 執行所有步驟，回傳最終上下文
    pub async fn execute(
        &self,
        model: &dyn ChatModel,
        variables: HashMap<String, String>,
    ) -> Result<ChainContext> {
        let mut context = ChainContext::new(self.next_execution_id()).with_variables(variables);
        tracing::info!("🔗 Running chain {} ({} steps)", context.execution_id, self.steps.len());

        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Chain execution started.");
        }

        for step in &self.steps {
            if !step.should_execute(&context) {
                tracing::info!("⏭️ Skipping step: {} (condition not met)", step.name());
                continue;
            }

            let start_time = Instant::now();
            match step.run(model, &context).await {
                Ok(text) => {
                    let result = StepResult {
                        step_name: step.name().to_string(),
                        output_key: step.output_key().to_string(),
                        text,
                        duration: start_time.elapsed(),
                    };

                    tracing::info!(
                        "✅ Step executed: {} (chars: {}, duration: {:?})",
                        result.step_name,
                        result.text.chars().count(),
                        result.duration
                    );

                    context.add_result(result);
                }
                Err(e) => {
                    tracing::error!("❌ Step execution failed: {}: {}", step.name(), e);
                    return Err(AgentError::ChainStepError {
                        stage: step.name().to_string(),
                        details: e.to_string(),
                    });
                }
            }
        }

        if let Some(monitor) = &self.monitor {
            monitor.log_stats("Chain execution completed.");
        }

        Ok(context)
    }

    /// 獲取執行摘要
    pub fn get_execution_summary(results: &[StepResult]) -> HashMap<String, serde_json::Value> {
        let mut summary = HashMap::new();

        let total_steps = results.len();
        let total_chars: usize = results.iter().map(|r| r.text.chars().count()).sum();
        let total_duration: std::time::Duration = results.iter().map(|r| r.duration).sum();

        summary.insert("total_steps".to_string(), serde_json::Value::Number(total_steps.into()));
        summary.insert("total_chars".to_string(), serde_json::Value::Number(total_chars.into()));
        summary.insert(
            "total_duration_ms".to_string(),
            serde_json::Value::Number((total_duration.as_millis() as u64).into()),
        );

        let step_names: Vec<serde_json::Value> = results
            .iter()
            .map(|r| serde_json::Value::String(r.step_name.clone()))
            .collect();
        summary.insert("executed_steps".to_string(), serde_json::Value::Array(step_names));

        summary
    }
}
