//! The `tools` subcommand: list the note tools and their parameters.

use hackmd_tools::ToolKind;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("Available note tools:");
    println!();

    for kind in ToolKind::ALL {
        let def = kind.definition();
        println!("  {}", def.name);
        println!("      {}", def.description);

        if let Some(props) = def.parameters.get("properties").and_then(|v| v.as_object()) {
            if !props.is_empty() {
                let required: Vec<&str> = def
                    .parameters
                    .get("required")
                    .and_then(|v| v.as_array())
                    .map(|a| a.iter().filter_map(|v| v.as_str()).collect())
                    .unwrap_or_default();

                let params: Vec<String> = props
                    .keys()
                    .map(|name| {
                        if required.contains(&name.as_str()) {
                            format!("{name}*")
                        } else {
                            name.clone()
                        }
                    })
                    .collect();
                println!("      params: {}", params.join(", "));
            }
        }
        println!();
    }

    println!("  (* = required)");
    Ok(())
}
