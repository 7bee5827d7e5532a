use pci_types::CommandRegister;

/// Command bits a root port needs before the hierarchy behind it is walked.
pub const ROOT_PORT_COMMAND: CommandRegister = CommandRegister::BUS_MASTER_ENABLE
    .union(CommandRegister::MEMORY_ENABLE)
    .union(CommandRegister::IO_ENABLE)
    .union(CommandRegister::PARITY_ERROR_RESPONSE)
    .union(CommandRegister::SERR_ENABLE);

/// Command half of a Command/Status word.
pub const fn command_of(command_status: u32) -> CommandRegister {
    CommandRegister::from_bits_retain(command_status as u16)
}

/// Sets [`ROOT_PORT_COMMAND`] in a Command/Status word. Every other bit,
/// the status half included, is kept.
pub const fn enable_root_port(command_status: u32) -> u32 {
    let command = command_of(command_status).union(ROOT_PORT_COMMAND);
    (command_status & 0xffff_0000) | command.bits() as u32
}

pub const fn has_root_port_enables(command_status: u32) -> bool {
    command_of(command_status).contains(ROOT_PORT_COMMAND)
}
