//! Test fixtures shared by the VM and network test suites.

#[cfg(test)]
pub mod utils {
    use crate::virtual_machine::assembler::assemble_source;
    use crate::virtual_machine::program::Program;

    /// Outputs a copy of itself.
    pub const QUINE: &str = "109,1,204,-1,1001,100,1,100,1008,100,16,101,1006,101,0,99";

    /// Outputs 34915192 * 34915192 = 1219070632396864.
    pub const LARGE_PRODUCT: &str = "1102,34915192,34915192,7,4,7,99,0";

    /// Outputs the literal 1125899906842624.
    pub const LARGE_LITERAL: &str = "104,1125899906842624,99";

    /// Reads one value; outputs 999 if it is below 8, 1000 if equal to 8, 1001 above.
    pub const COMPARE_TO_EIGHT: &str = "3,21,1008,21,8,20,1005,20,22,107,8,21,20,1006,20,31,\
        1106,0,36,98,0,0,1002,21,125,20,4,20,1105,1,46,104,999,1105,1,46,1101,1000,1,20,4,\
        20,1105,1,46,98,99";

    /// Amplifier for a feedback loop: reads a phase setting, then repeatedly reads a
    /// signal and outputs a transformed one, halting after five rounds.
    pub const FEEDBACK_AMPLIFIER: &str = "3,26,1001,26,-4,26,3,27,1002,27,2,27,1,27,26,\
        27,4,27,1001,28,-1,28,1005,28,6,99,0,0,5";

    /// Network node used by the fabric tests.
    ///
    /// Every node reads its address first. Node 1 sends a single packet `(255, 7, 42)`
    /// and then drains its input forever. Every other node waits for packets and echoes
    /// each one to the broadcast address.
    pub const ECHO_NODE_SOURCE: &str = r#"
                in   [addr]
                eq   [addr], 1, [tmp]
                jnz  [tmp], sender
        wait:   in   [x]
                eq   [x], -1, [tmp]
                jnz  [tmp], wait
                in   [y]
                out  255
                out  [x]
                out  [y]
                jnz  1, wait
        sender: out  255
                out  7
                out  42
        silent: in   [x]
                jnz  1, silent
        addr:   data 0
        x:      data 0
        y:      data 0
        tmp:    data 0
    "#;

    pub fn program(text: &str) -> Program {
        text.parse().expect("fixture program must parse")
    }

    pub fn echo_node() -> Program {
        assemble_source(ECHO_NODE_SOURCE).expect("fixture source must assemble")
    }
}
