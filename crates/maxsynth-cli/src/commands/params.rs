//! Parameter listing and information command.

#![allow(clippy::print_literal)] // Table headers use literal strings intentionally

use clap::Args;
use maxsynth_core::{ParamDescriptor, ParamScale};
use maxsynth_synth::{PARAMS, ParamIndex};

#[derive(Args)]
pub struct ParamsArgs {
    /// Show details for a specific parameter
    #[arg(value_name = "ID")]
    id: Option<String>,
}

fn format_value(desc: &ParamDescriptor, value: f32) -> String {
    match desc.choice_label(value) {
        Some(label) => label.to_string(),
        None => format!("{value}{}", desc.unit.suffix()),
    }
}

fn format_range(desc: &ParamDescriptor) -> String {
    if desc.choices.is_empty() {
        format!("{} .. {}{}", desc.min, desc.max, desc.unit.suffix())
    } else {
        desc.choices.join(" | ")
    }
}

fn show_param(param: ParamIndex) {
    let desc = param.descriptor();
    let title = format!("{} ({})", desc.name, desc.string_id);
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("  Group:    {}", desc.group);
    println!("  Default:  {}", format_value(desc, desc.default));
    println!("  Range:    {}", format_range(desc));
    let scale = match desc.scale {
        _ if desc.is_stepped() => "stepped",
        ParamScale::Logarithmic => "logarithmic",
        ParamScale::Linear => "linear",
    };
    println!("  Scale:    {scale}");
    println!();
    println!("Example usage:");
    println!();
    println!(
        "  maxsynth render out.wav --set {}={}",
        desc.string_id,
        format_value(desc, desc.default).replace(' ', "")
    );
}

pub fn run(args: ParamsArgs) -> anyhow::Result<()> {
    if let Some(id) = &args.id {
        let param =
            ParamIndex::from_id(id).ok_or_else(|| anyhow::anyhow!("Unknown parameter: {id}"))?;
        show_param(param);
        return Ok(());
    }

    println!("Synth Parameters");
    println!("================");

    let mut group = "";
    for desc in &PARAMS {
        if desc.group != group {
            group = desc.group;
            println!();
            println!("{group}");
            println!("  {:20}  {:14}  {}", "ID", "Default", "Range");
        }
        println!(
            "  {:20}  {:14}  {}",
            desc.string_id,
            format_value(desc, desc.default),
            format_range(desc)
        );
    }

    println!();
    println!("Use 'maxsynth params <ID>' for details on a parameter.");

    Ok(())
}
