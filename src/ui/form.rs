use crate::core::agent::TravelAgent;
use crate::domain::model::TravelMode;
use crate::domain::ports::ChatModel;
use crate::utils::error::Result;
use std::io::{BufRead, Write};

pub const OPTION_LABEL: &str = "Escolha uma opção";
pub const INPUT_LABEL: &str = "Digite seu interesse ou país/cidade";
pub const INPUT_PLACEHOLDER: &str = "Exemplo: praia, Paris, etc.";
pub const SUBMIT_LABEL: &str = "Gerar Roteiro";
pub const OUTPUT_LABEL: &str = "Roteiro de viagem";

/// 解析下拉選單：接受編號或完整標籤
pub fn parse_choice(line: &str) -> Option<TravelMode> {
    let line = line.trim();
    if let Ok(index) = line.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| TravelMode::ALL.get(i).copied());
    }
    TravelMode::from_label(line)
}

fn read_line<R: BufRead>(reader: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

/// 終端機表單：選擇模式、輸入文字、顯示結果，直到 EOF 或輸入 q
pub async fn run_form<M, R, W>(agent: &TravelAgent<M>, mut reader: R, mut writer: W) -> Result<()>
where
    M: ChatModel,
    R: BufRead,
    W: Write,
{
    loop {
        writeln!(writer, "{}:", OPTION_LABEL)?;
        for (index, mode) in TravelMode::ALL.iter().enumerate() {
            writeln!(writer, "  {}) {}", index + 1, mode.label())?;
        }
        write!(writer, "> ")?;
        writer.flush()?;

        let Some(choice) = read_line(&mut reader)? else {
            break;
        };
        if choice.trim().eq_ignore_ascii_case("q") {
            break;
        }
        let Some(mode) = parse_choice(&choice) else {
            writeln!(writer, "Opção inválida: '{}'\n", choice.trim())?;
            continue;
        };

        writeln!(writer, "{} ({}):", INPUT_LABEL, INPUT_PLACEHOLDER)?;
        write!(writer, "> ")?;
        writer.flush()?;

        let Some(user_input) = read_line(&mut reader)? else {
            break;
        };

        writeln!(writer, "[{}] ...", SUBMIT_LABEL)?;
        writer.flush()?;

        let output = agent.process_input(mode, &user_input).await;
        writeln!(writer, "\n{}:\n{}\n", OUTPUT_LABEL, output)?;
    }

    writer.flush()?;
    Ok(())
}
