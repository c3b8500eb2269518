/// WGSL compilation reported errors. Fatal at startup.
#[derive(Debug, thiserror::Error)]
#[error("shader `{label}` failed to compile:\n{messages}")]
pub struct ShaderCompileError {
    pub label: String,
    pub messages: String,
}

/// Compiles a WGSL module and checks the compiler's diagnostics.
///
/// Warnings are logged; any error message fails the whole module.
pub fn compile(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> Result<wgpu::ShaderModule, ShaderCompileError> {
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    let info = pollster::block_on(module.get_compilation_info());
    let mut errors = Vec::new();
    for msg in &info.messages {
        match msg.message_type {
            wgpu::CompilationMessageType::Error => errors.push(format_message(msg)),
            wgpu::CompilationMessageType::Warning => {
                log::warn!("shader `{label}`: {}", format_message(msg));
            }
            wgpu::CompilationMessageType::Info => {
                log::debug!("shader `{label}`: {}", format_message(msg));
            }
        }
    }

    if !errors.is_empty() {
        return Err(ShaderCompileError {
            label: label.to_string(),
            messages: errors.join("\n"),
        });
    }

    log::debug!("shader `{label}` compiled");
    Ok(module)
}

fn format_message(msg: &wgpu::CompilationMessage) -> String {
    match &msg.location {
        Some(loc) => format!("{}:{}: {}", loc.line_number, loc.line_position, msg.message),
        None => msg.message.clone(),
    }
}
