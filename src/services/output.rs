use crate::domain::models::JsonOut;
use serde::Serialize;
use std::io::Write;

pub fn print_json<T: Serialize>(out: &mut impl Write, data: T) -> anyhow::Result<()> {
    writeln!(
        out,
        "{}",
        serde_json::to_string_pretty(&JsonOut { ok: true, data })?
    )?;
    Ok(())
}
