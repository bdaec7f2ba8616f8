//! Solidity bindings for the interop predeploys.

use alloy_sol_types::sol;

sol! {
    /// The `CrossL2Inbox` predeploy, which validates and executes cross chain messages.
    #[derive(Debug, PartialEq, Eq)]
    interface ICrossL2Inbox {
        /// @notice A pointer to a log emitted on a remote (or local) chain.
        struct Identifier {
            address origin;
            uint256 blockNumber;
            uint256 logIndex;
            uint256 timestamp;
            uint256 chainId;
        }

        /// @notice Emitted when a cross chain message is being executed.
        event ExecutingMessage(bytes32 indexed msgHash, Identifier id);

        /// @notice Thrown when the identifier chain id is not in the dependency set.
        error InvalidChainId();
        /// @notice Thrown when the identifier timestamp is in the future.
        error InvalidTimestamp();
        /// @notice Thrown when the inbox is read outside of an execution context.
        error NotEntered();
        /// @notice Thrown on a reentrant call into `executeMessage`.
        error ReentrantCall();
        /// @notice Thrown when the call to the message target fails.
        error TargetCallFailed();

        function executeMessage(Identifier calldata _id, address _target, bytes calldata _message) external payable;

        function validateMessage(Identifier calldata _id, bytes32 _msgHash) external;
    }

    /// The `L2ToL2CrossDomainMessenger` predeploy, which sends and relays cross chain messages.
    #[derive(Debug, PartialEq, Eq)]
    interface IL2ToL2CrossDomainMessenger {
        /// @notice Emitted when a message is successfully relayed on the destination chain.
        event RelayedMessage(bytes32 indexed messageHash);

        /// @notice Emitted when a relayed message fails to execute on the destination chain.
        event FailedRelayedMessage(bytes32 indexed messageHash);

        /// The "message sent" log payload is the ABI encoding of this call.
        function relayMessage(
            uint256 _destination,
            uint256 _source,
            uint256 _nonce,
            address _sender,
            address _target,
            bytes calldata _message
        ) external payable;
    }
}
