//! Effect inspection command

use anyhow::{Context, Result};
use lantern_data::{Binding, BindingSource};
use lantern_render::parse_effect;

pub fn run(path: &str) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;
    let effect = parse_effect(&content)?;

    println!("Effect: {}", effect.name());

    let mut names: Vec<&str> = effect.technique_names().collect();
    names.sort_unstable();
    for name in names {
        let technique = effect.technique(name)?;
        println!("  Technique: {}", technique.name);

        for pass in &technique.passes {
            println!(
                "    Pass: {} (priority {}, {:?})",
                pass.name, pass.states.priority, pass.states.blending
            );
            println!(
                "      shaders: {} / {}",
                pass.vertex_shader, pass.fragment_shader
            );
            for (input, binding) in &pass.attribute_bindings {
                println!("      attribute {input} <- {}", describe(binding));
            }
            for (input, binding) in &pass.uniform_bindings {
                println!("      uniform {input} <- {}", describe(binding));
            }
            for (name, binding) in &pass.macro_bindings {
                println!(
                    "      macro {name} <- {}:{}",
                    source_name(binding.source),
                    binding.property
                );
            }
            if let Some(fallback) = &pass.fallback {
                println!("      fallback: {fallback}");
            }
        }
    }

    Ok(())
}

fn describe(binding: &Binding) -> String {
    let suffix = if binding.required { "" } else { " (optional)" };
    format!(
        "{}:{}{}",
        source_name(binding.source),
        binding.property,
        suffix
    )
}

fn source_name(source: BindingSource) -> &'static str {
    match source {
        BindingSource::Target => "target",
        BindingSource::Renderer => "renderer",
        BindingSource::Root => "root",
    }
}
